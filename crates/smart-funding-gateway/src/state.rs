use std::sync::Arc;

use funding::{CookieStore, FundingMemory, SystemClock};

use crate::config::GatewayConfig;
use crate::iframe::IframeGateway;
use crate::meta::ProviderMetaUnpacker;
use crate::nonce::RandomNonce;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gateway: Arc<IframeGateway>,
}

impl AppState {
    /// Production wiring: wall clock, random nonces, provider-domain SDK URLs.
    pub fn new(config: GatewayConfig) -> Self {
        let memory = FundingMemory::new(
            CookieStore::new(config.sdk_cookie_name.clone()),
            config.funding_config.clone(),
        );
        let gateway = IframeGateway::new(
            config.allow_list.clone(),
            memory,
            Box::new(ProviderMetaUnpacker::new(config.provider_domain.clone())),
            Box::new(RandomNonce),
            Box::new(SystemClock),
            config.provider_domain.clone(),
            config.sdk_namespace.clone(),
        );
        Self::with_gateway(config, gateway)
    }

    pub fn with_gateway(config: GatewayConfig, gateway: IframeGateway) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        }
    }
}
