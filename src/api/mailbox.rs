use reqwest::Method;

use super::ApiClient;
use crate::errors::ConsoleError;
use crate::models::mailbox::DeleteMessagesRequest;

impl ApiClient {
    pub async fn delete_messages(&self, request: &DeleteMessagesRequest) -> Result<(), ConsoleError> {
        let req = self
            .request(Method::POST, "api/v1/delete-messages")?
            .json(request);
        self.fetch_empty(req).await
    }
}
