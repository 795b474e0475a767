pub mod health_handlers;
pub mod lambda_handlers;
pub mod photo_handlers;
