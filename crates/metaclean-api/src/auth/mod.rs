pub mod middleware;

pub use middleware::{api_key_middleware, AuthState, API_KEY_HEADER};
