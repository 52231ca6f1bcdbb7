use std::net::SocketAddr;
use std::sync::Arc;

use netmap_proto::pb;
use netmap_proto::pb::netmap_rpc_server::{NetmapRpc, NetmapRpcServer};
use netmap_proto::ConvertError;
use netmap_store::{Store, StoreError};
use netmap_types::{ExpArgs, RecArgs};
use tonic::{Request, Response, Status};

/// Exposes a [`Store`] over the peer RPC surface.
pub struct GrpcServer<S> {
    store: Arc<S>,
}

impl<S> GrpcServer<S>
where
    S: Store + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        GrpcServer { store }
    }

    /// Runs the server, listening for peer connections on `addr`, until the
    /// process is torn down.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), anyhow::Error> {
        self.serve_with_shutdown(addr, std::future::pending()).await
    }

    /// Like [`Self::serve`], but stops accepting new connections and lets
    /// in-flight ones finish once `shutdown` resolves.
    pub async fn serve_with_shutdown(
        self,
        addr: SocketAddr,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), anyhow::Error> {
        tracing::info!(%addr, "starting peer rpc server");
        tonic::transport::Server::builder()
            .add_service(NetmapRpcServer::new(self))
            .serve_with_shutdown(addr, shutdown)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S> NetmapRpc for GrpcServer<S>
where
    S: Store + 'static,
{
    async fn healthy(&self, _request: Request<pb::Empty>) -> Result<Response<pb::Empty>, Status> {
        Ok(Response::new(pb::Empty {}))
    }

    async fn set_status(
        &self,
        request: Request<pb::RecordList>,
    ) -> Result<Response<pb::Empty>, Status> {
        let records = Vec::try_from(request.into_inner()).map_err(convert_status)?;
        self.store.save_status(records).await.map_err(store_status)?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn set_netstat(
        &self,
        request: Request<pb::RecordList>,
    ) -> Result<Response<pb::Empty>, Status> {
        let records = Vec::try_from(request.into_inner()).map_err(convert_status)?;
        self.store.save_netstat(records).await.map_err(store_status)?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn set_tracert(
        &self,
        request: Request<pb::RecordList>,
    ) -> Result<Response<pb::Empty>, Status> {
        let records = Vec::try_from(request.into_inner()).map_err(convert_status)?;
        self.store.save_tracert(records).await.map_err(store_status)?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn get_records(
        &self,
        request: Request<pb::RecArgs>,
    ) -> Result<Response<pb::RecordList>, Status> {
        let args = RecArgs::try_from(request.into_inner()).map_err(convert_status)?;
        let records = self.store.load_records(args).await.map_err(store_status)?;
        Ok(Response::new(pb::RecordList::from(records)))
    }

    async fn set_records(
        &self,
        request: Request<pb::RecordList>,
    ) -> Result<Response<pb::Empty>, Status> {
        let records = Vec::try_from(request.into_inner()).map_err(convert_status)?;
        self.store.save_records(records).await.map_err(store_status)?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn del_records(
        &self,
        request: Request<pb::IdList>,
    ) -> Result<Response<pb::Empty>, Status> {
        let ids = Vec::from(request.into_inner());
        self.store.del_records(ids).await.map_err(store_status)?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn get_exceptions(
        &self,
        request: Request<pb::ExpArgs>,
    ) -> Result<Response<pb::ExceptionList>, Status> {
        let args = ExpArgs::from(request.into_inner());
        let exceptions = self
            .store
            .load_exceptions(args)
            .await
            .map_err(store_status)?;
        Ok(Response::new(pb::ExceptionList::from(exceptions)))
    }

    async fn set_exceptions(
        &self,
        request: Request<pb::ExceptionList>,
    ) -> Result<Response<pb::Empty>, Status> {
        let exceptions = Vec::from(request.into_inner());
        self.store
            .save_exceptions(exceptions)
            .await
            .map_err(store_status)?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn del_exceptions(
        &self,
        request: Request<pb::IdList>,
    ) -> Result<Response<pb::Empty>, Status> {
        let ids = Vec::from(request.into_inner());
        self.store.del_exceptions(ids).await.map_err(store_status)?;
        Ok(Response::new(pb::Empty {}))
    }
}

fn convert_status(err: ConvertError) -> Status {
    Status::invalid_argument(err.to_string())
}

fn store_status(err: StoreError) -> Status {
    match err {
        StoreError::LimitExceeded => Status::resource_exhausted("limit exceeded"),
        StoreError::Backend(msg) => Status::internal(msg),
    }
}
