use serde::Deserialize;

use crate::error::TransferError;

use super::{
    transfer::RemoteStore,
    transport::{Request, Transport},
};

#[derive(Debug, Deserialize)]
struct SearchReply {
    #[serde(default)]
    files: Vec<String>,
}

impl<T: Transport> RemoteStore<T> {
    /// Names of the remote files matching `terms`; every file when `terms` is
    /// empty.
    pub async fn search(
        &mut self,
        terms: &[String],
    ) -> Result<Vec<String>, TransferError> {
        let reply = self
            .transport_mut()
            .request(&Request::search(terms))
            .await?;
        let reply: SearchReply = serde_json::from_slice(&reply)?;

        Ok(reply.files)
    }
}
