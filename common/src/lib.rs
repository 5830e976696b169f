//! Portfolio Admin Common Library
//!
//! CLIと対話コンソールで共有される型と状態機械（I/Oなし）

pub mod types;
pub mod error;
pub mod staging;
pub mod mirror;
pub mod session;

pub use types::{Client, PortfolioItem, Entity, SessionToken, LoginRequest, LoginResponse, UploadFile};
pub use error::{Error, Result};
pub use staging::{
    Draft, StagingBuffer, ClientDraft, ClientField, ClientForm,
    PortfolioDraft, PortfolioField, PortfolioForm,
};
pub use mirror::CollectionMirror;
pub use session::{AuthState, SessionGate, credentials};
