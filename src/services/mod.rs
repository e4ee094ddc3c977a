pub mod chat_service;
pub mod janitor;
pub mod lifecycle;
pub mod match_service;
pub mod message_service;
pub mod oauth_service;
pub mod tournament_service;
pub mod user_service;
