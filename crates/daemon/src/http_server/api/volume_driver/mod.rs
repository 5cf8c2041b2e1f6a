//! `/VolumeDriver.*` endpoints.

use axum::routing::post;
use axum::Router;

use crate::ServiceState;

pub mod capabilities;
pub mod create;
pub mod get;
pub mod list;
pub mod mount;
pub mod path;
pub mod remove;
pub mod unmount;

pub use get::VolumeBody;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/VolumeDriver.Create", post(create::handler))
        .route("/VolumeDriver.Remove", post(remove::handler))
        .route("/VolumeDriver.Get", post(get::handler))
        .route("/VolumeDriver.List", post(list::handler))
        .route("/VolumeDriver.Path", post(path::handler))
        .route("/VolumeDriver.Mount", post(mount::handler))
        .route("/VolumeDriver.Unmount", post(unmount::handler))
        .route("/VolumeDriver.Capabilities", post(capabilities::handler))
        .with_state(state)
}
