pub mod auth_client;
pub mod config;
pub mod error;
pub mod event_log;
pub mod mock_data;
pub mod profile_repository;
pub mod session_store;
pub mod supabase_client;
