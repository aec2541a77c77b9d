//! Server-rendered front end. Each form post maps to one controller operation
//! and answers with a redirect back to the page.

pub mod response;
pub mod routes;
