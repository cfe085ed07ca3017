pub mod aktien;
pub mod health;
pub mod state;
pub mod symbols;

use actix_web::web;

use crate::services::aktien::AktienApi;

pub use state::AppState;

pub fn config<A: AktienApi + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(aktien::config::<A>)
            .configure(symbols::config::<A>)
    );
}
