/// Generates the `list_<rows>` and `delete_<row>` methods for one table handle
/// on [`RemoteGateway`](crate::clients::RemoteGateway).
#[macro_export]
macro_rules! impl_table_methods {
    ($client_name:ident, $field:ident, $row:ty, $row_snake:ident, $rows_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $rows_snake>](&self) -> Result<Vec<$row>, $crate::actor_framework::GatewayError> {
                    tracing::debug!("Sending request");
                    self.$field.select().await
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $row_snake>](&self, id: String) -> Result<(), $crate::actor_framework::GatewayError> {
                    tracing::debug!("Sending request");
                    self.$field.delete(id).await
                }
            }
        }
    };
}

/// Generates a request/response method on a service client. The request enum
/// variant gets the listed parameters plus a `respond_to` oneshot sender.
#[macro_export]
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}
