//! Safety and usage policy gates
//!
//! Both gates run before any persistence or provider call: a message that
//! trips either one never reaches storage or the model.

pub mod crisis;
pub mod quota;
