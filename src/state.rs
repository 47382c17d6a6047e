// Shared handles passed to every handler

use std::convert::Infallible;
use warp::Filter;

use crate::auth::TokenKeys;
use crate::llm::ChatRelay;
use crate::store::Store;
use crate::uploads::UploadDir;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub relay: ChatRelay,
    pub tokens: TokenKeys,
    pub bcrypt_cost: u32,
    pub uploads: UploadDir,
}

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
