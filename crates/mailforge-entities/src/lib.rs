pub mod domains;
pub mod events;
pub mod mailboxes;
pub mod tenants;
pub mod workspaces;
