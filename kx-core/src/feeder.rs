use async_trait::async_trait;

use crate::errors::EmptyResult;

/// A background source of registry mutations.
///
/// `start` populates the registry once, before anything is served; an error here is fatal to the
/// process.  `run` then keeps the registry moving for the lifetime of the process and only returns
/// if the feeder cannot continue at all.
#[async_trait]
pub trait PodFeeder: Send {
    fn name(&self) -> &'static str;

    async fn start(&mut self) -> EmptyResult;

    async fn run(&mut self) -> EmptyResult;
}
