mod audit;
mod convert;
mod handlers;
mod routes;

pub use routes::create_router;
