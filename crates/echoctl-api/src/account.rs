// Account-level endpoints
//
// Device directory, linked-service lookup, and TuneIn search. These are
// the only cacheable reads (devices and account details); search always
// goes to the network.

use std::sync::Arc;

use tracing::debug;

use crate::client::{GetOptions, SessionClient, with_query};
use crate::device::Device;
use crate::error::Error;
use crate::models::{
    AccountDetailsResponse, DevicesResponse, LinkedService, SearchResponse, ServiceAccount,
    Station,
};

/// Service name of the TuneIn radio integration.
pub const TUNE_IN: &str = "TUNE_IN";

/// Handle to the logged-in account. Cheap to clone; all clones share one
/// [`SessionClient`] and therefore one response cache.
#[derive(Debug, Clone)]
pub struct Account {
    client: Arc<SessionClient>,
}

impl Account {
    pub fn new(client: SessionClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// The underlying session client.
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    /// All controllable devices, in the order the API lists them.
    ///
    /// `GET /api/devices-v2/device` (cached). Devices without any
    /// capability (apps, phones, some groups) are dropped.
    pub async fn devices(&self) -> Result<Vec<Device>, Error> {
        let resp: DevicesResponse = self
            .client
            .get("/api/devices-v2/device", &GetOptions::default())
            .await?;
        let total = resp.devices.len();

        let devices: Vec<Device> = resp
            .devices
            .into_iter()
            .filter(|record| record.is_controllable())
            .map(|record| Device::new(record, self.clone()))
            .collect();

        debug!(total, controllable = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Look up a controllable device by its display name.
    pub async fn device_by_name(&self, name: &str) -> Result<Device, Error> {
        self.devices()
            .await?
            .into_iter()
            .find(|device| device.name() == name)
            .ok_or_else(|| Error::NotFound {
                what: format!("device '{name}'"),
            })
    }

    /// Services linked to the account.
    ///
    /// `GET /api/music-account-details` (cached)
    pub async fn account_details(&self) -> Result<Vec<LinkedService>, Error> {
        let resp: AccountDetailsResponse = self
            .client
            .get("/api/music-account-details", &GetOptions::default())
            .await?;
        Ok(resp.account_details)
    }

    /// Resolve the linked account of `service`.
    ///
    /// Only the first entry named `service` is consulted, and only its first
    /// account is returned. If that entry is missing or has no accounts the
    /// lookup fails with [`Error::NotFound`].
    pub async fn service_account(&self, service: &str) -> Result<ServiceAccount, Error> {
        let details = self.account_details().await?;
        details
            .into_iter()
            .find(|linked| linked.service == service)
            .and_then(|linked| linked.accounts.into_iter().next())
            .ok_or_else(|| Error::NotFound {
                what: format!("linked account for service {service}"),
            })
    }

    /// Search TuneIn stations, returned in API order.
    ///
    /// `GET /api/tunein/search?query=..&mediaOwnerCustomerId=..` (never cached)
    pub async fn tunein_search(&self, query: &str) -> Result<Vec<Station>, Error> {
        let account = self.service_account(TUNE_IN).await?;
        debug!(query, "searching TuneIn");

        let path = with_query(
            "/api/tunein/search",
            &[
                ("query", query),
                ("mediaOwnerCustomerId", account.customer_id.as_str()),
            ],
        );
        let resp: SearchResponse = self.client.get(&path, &GetOptions::uncached()).await?;
        Ok(resp.browse_list)
    }
}
