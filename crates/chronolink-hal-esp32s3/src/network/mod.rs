//! esp-radio station driver and the link event sources feeding the controller.

use chronolink_core::{
    config::{AuthFloor, JoinConfig},
    network::{LinkEvent, LinkEventQueue, StationDriver},
};
use embassy_net::Stack;
use esp_radio::wifi::{
    AuthMethod, ClientConfig, ModeConfig, WifiController, WifiError,
    event::{self, EventExt},
};
use log::{debug, info, warn};

/// Station-mode wrapper around the esp-radio controller.
pub struct EspStation<'d> {
    controller: WifiController<'d>,
}

impl<'d> EspStation<'d> {
    pub const fn new(controller: WifiController<'d>) -> Self {
        Self { controller }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.controller.is_connected(), Ok(true))
    }
}

impl StationDriver for EspStation<'_> {
    type Error = WifiError;

    fn configure(&mut self, config: &JoinConfig) -> Result<(), Self::Error> {
        // An open network cannot satisfy any stronger floor.
        let auth_method = if config.password().is_empty() {
            AuthMethod::None
        } else {
            auth_method(config.auth_floor())
        };

        // esp-radio picks the SAE derivation itself; the setting is only recorded.
        info!(
            "wifi: station mode ssid={} auth={:?} sae={} sae_id_set={}",
            config.ssid(),
            auth_method,
            config.sae_mode().as_str(),
            !config.sae_identifier().is_empty()
        );

        let client = ClientConfig::default()
            .with_ssid(config.ssid().into())
            .with_password(config.password().into())
            .with_auth_method(auth_method);
        self.controller.set_config(&ModeConfig::Client(client))
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        if self.controller.is_started()? {
            debug!("wifi: restarting driver for a new join cycle");
            self.controller.stop_async().await?;
        }
        self.controller.start_async().await
    }

    async fn associate(&mut self) -> Result<(), Self::Error> {
        self.controller.connect_async().await
    }
}

fn auth_method(floor: AuthFloor) -> AuthMethod {
    match floor {
        AuthFloor::Open => AuthMethod::None,
        AuthFloor::Wep => AuthMethod::Wep,
        AuthFloor::WpaPsk => AuthMethod::Wpa,
        AuthFloor::Wpa2Psk => AuthMethod::Wpa2Personal,
        AuthFloor::WpaWpa2Psk => AuthMethod::WpaWpa2Personal,
        AuthFloor::Wpa3Psk => AuthMethod::Wpa3Personal,
        AuthFloor::Wpa2Wpa3Psk => AuthMethod::Wpa2Wpa3Personal,
        AuthFloor::WapiPsk => AuthMethod::WapiPersonal,
    }
}

/// Route esp-radio station events into `queue`.
///
/// Handlers run in the radio's event context and never block; an event that
/// does not fit the queue is dropped and logged.
pub fn install_link_event_bridge(queue: &'static LinkEventQueue) {
    event::StaStart::update_handler(move |_| publish(queue, LinkEvent::StationStarted));

    event::StaDisconnected::update_handler(move |event| {
        publish(
            queue,
            LinkEvent::Disassociated {
                reason: event.reason(),
            },
        )
    });
}

fn publish(queue: &LinkEventQueue, event: LinkEvent) {
    if queue.try_send(event).is_err() {
        warn!("wifi: link event queue full; dropped {:?}", event);
    }
}

/// Report every DHCP lease on the station interface as
/// [`LinkEvent::AddressAcquired`].
pub async fn watch_ipv4(stack: Stack<'_>, queue: &LinkEventQueue) -> ! {
    loop {
        stack.wait_config_up().await;
        if let Some(config) = stack.config_v4() {
            queue
                .send(LinkEvent::AddressAcquired(config.address.address()))
                .await;
        }

        stack.wait_config_down().await;
        debug!("wifi: ipv4 config lost");
    }
}
