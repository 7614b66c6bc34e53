//! # zuora - object mapping client for the Zuora SOAP API
//!
//! Domain objects are plain structs declared with [`zobject!`]. A [`Client`]
//! holds the session and sends every call; persistence goes through the
//! [`Persistable`] trait implemented by every object:
//!
//! ```no_run
//! use zuora::prelude::*;
//! use zuoraconfig::ClientSettings;
//!
//! # fn main() -> zuora::Result<()> {
//! let client = Client::new(ClientSettings::new("api@example.com", "secret"));
//! client.sandbox();
//!
//! if let Some(mut product) = Product::find(&client, "4028e4883491c50901349d061be06550")? {
//!     for plan in product.product_rate_plans(&client)? {
//!         println!("{:?}", plan.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! - [`session`]: login and session reuse
//! - [`gateway`]: the single path of every remote call
//! - [`attributes`]: typed fields and their wire text
//! - [`associations`]: child collections, fetched lazily or attached inline
//! - [`persistence`]: `save`, `destroy`, `find`, `where_`, batch create
//! - [`result`]: classification of responses

pub mod associations;
pub mod attributes;
pub mod client;
pub mod contract;
pub mod error;
pub mod gateway;
pub mod instrumentation;
pub mod object;
pub mod objects;
pub mod persistence;
pub mod query;
pub mod result;
pub mod session;
pub mod transport;
pub mod validation;

pub use client::{Client, UserInfo};
pub use contract::{Contract, ZuoraContract};
pub use error::{RemoteFault, Result, ZuoraError};
pub use object::{Errors, ObjectState, Record, ZObject};
pub use persistence::{Persistable, Submittable, create_all};
pub use query::Zoql;
pub use result::{AmendResult, OperationResult, Outcome, QueryResult, ResultError};
pub use session::{Credentials, Session};
pub use transport::{HttpTransport, Transport};
pub use validation::{Validatable, ValidationErrors};

pub use rust_decimal::Decimal;

/// Traits and types needed by most callers
pub mod prelude {
    pub use crate::attributes::Serializable;
    pub use crate::objects::*;
    pub use crate::{
        Client, Decimal, Persistable, Record, Submittable, Validatable, ZObject, Zoql, create_all,
    };
}
