//! Cat image client for The Cat API
//!
//! A thin passthrough over `https://api.thecatapi.com`: one outbound request
//! per invocation, no retries, no caching. Responses are normalized into
//! [`CatPhoto`] records before leaving this module.
//!
//! The [`CatImageSource`] trait is the seam between tool dispatch and the
//! network, so handlers can be exercised against a recording stub.

pub mod client;
pub mod types;

pub use client::{CatApiClient, CatApiError, CatImageSource, API_ENDPOINT, FETCH_TIMEOUT};
pub use types::{CatBreed, CatImage, CatPhoto};
