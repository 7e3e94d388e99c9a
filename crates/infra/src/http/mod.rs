//! HTTP transport: the regional driver, the sender seam and the response
//! envelope.

pub mod client;
pub mod response;
pub mod sender;

pub use client::{user_agent, RestClient, RestClientBuilder};
pub use response::{decode_response, BaseResponse, ErrorBody, ServiceResponse};
pub use sender::{HttpSender, ReqwestSender};
