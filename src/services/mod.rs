pub mod action_dispatcher;
pub mod application_store;
pub mod backend_client;
pub mod feedback;
pub mod view_projection;
