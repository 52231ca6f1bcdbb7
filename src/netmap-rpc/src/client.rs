use std::time::Duration;

use netmap_proto::pb;
use netmap_proto::pb::netmap_rpc_client::NetmapRpcClient;
use netmap_types::{ExpArgs, Exception, NetmapError, RecArgs, SockTable};
use tonic::transport::{Channel, Endpoint};

/// A client to a peer's RPC surface, backed by a persistent gRPC channel.
/// Cheap to clone: `tonic`'s generated client wraps a `Channel`, which is
/// itself a cheap, poolable handle, so each fan-out call can clone its own
/// client and use it concurrently.
#[derive(Clone)]
pub struct GrpcClient {
    inner: NetmapRpcClient<Channel>,
}

impl GrpcClient {
    /// Dials `addr` with the peer-manager's default 2 s connect timeout.
    pub async fn connect(addr: &str) -> Result<Self, NetmapError> {
        Self::connect_timeout(addr, Duration::from_secs(2)).await
    }

    pub async fn connect_timeout(addr: &str, timeout: Duration) -> Result<Self, NetmapError> {
        let endpoint = Endpoint::from_shared(format!("http://{addr}"))
            .map_err(|err| NetmapError::PeerUnreachable(err.to_string()))?
            .connect_timeout(timeout);
        let channel = endpoint
            .connect()
            .await
            .map_err(|err| NetmapError::PeerUnreachable(err.to_string()))?;
        Ok(GrpcClient {
            inner: NetmapRpcClient::new(channel),
        })
    }

    /// The lightweight health call the peer housekeeping loop issues on
    /// every tick against connections it already holds.
    pub async fn healthy(&mut self) -> Result<(), NetmapError> {
        self.inner
            .healthy(pb::Empty {})
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }

    pub async fn set_status(&mut self, records: Vec<SockTable>) -> Result<(), NetmapError> {
        self.inner
            .set_status(pb::RecordList::from(records))
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }

    pub async fn set_netstat(&mut self, records: Vec<SockTable>) -> Result<(), NetmapError> {
        self.inner
            .set_netstat(pb::RecordList::from(records))
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }

    pub async fn set_tracert(&mut self, records: Vec<SockTable>) -> Result<(), NetmapError> {
        self.inner
            .set_tracert(pb::RecordList::from(records))
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }

    pub async fn get_records(&mut self, args: RecArgs) -> Result<Vec<SockTable>, NetmapError> {
        let reply = self
            .inner
            .get_records(pb::RecArgs::from(args))
            .await
            .map_err(status_to_error)?;
        Vec::<SockTable>::try_from(reply.into_inner()).map_err(Into::into)
    }

    pub async fn set_records(&mut self, records: Vec<SockTable>) -> Result<(), NetmapError> {
        self.inner
            .set_records(pb::RecordList::from(records))
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }

    pub async fn del_records(&mut self, ids: Vec<String>) -> Result<(), NetmapError> {
        self.inner
            .del_records(pb::IdList::from(ids))
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }

    pub async fn get_exceptions(&mut self, args: ExpArgs) -> Result<Vec<Exception>, NetmapError> {
        let reply = self
            .inner
            .get_exceptions(pb::ExpArgs::from(args))
            .await
            .map_err(status_to_error)?;
        Ok(Vec::<Exception>::from(reply.into_inner()))
    }

    pub async fn set_exceptions(&mut self, exceptions: Vec<Exception>) -> Result<(), NetmapError> {
        self.inner
            .set_exceptions(pb::ExceptionList::from(exceptions))
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }

    pub async fn del_exceptions(&mut self, ids: Vec<String>) -> Result<(), NetmapError> {
        self.inner
            .del_exceptions(pb::IdList::from(ids))
            .await
            .map(|_| ())
            .map_err(status_to_error)
    }
}

fn status_to_error(status: tonic::Status) -> NetmapError {
    NetmapError::PeerUnreachable(status.message().to_string())
}
