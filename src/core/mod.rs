/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod errors;
pub mod executor;
pub mod gateway;
pub mod hierarchy;
pub mod plan;
pub mod record;
pub mod relation;
pub mod tags;
pub mod utils;
