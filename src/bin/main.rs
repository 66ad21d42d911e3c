#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use chronolink_core::{
    bringup::bring_up,
    config::BuildOptions,
    network::{ConnectionController, JoinStatusHandle, LinkEventQueue},
    status::Status,
    time::{TimeSynchronizer, WallClock},
};
use chronolink_hal_esp32s3::{
    network::{EspStation, install_link_event_bridge, watch_ipv4},
    time::{
        EmbassyPause, RtcWallClock,
        sntp::{SntpClient, SntpControl, SntpRunner},
    },
};
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{clock::CpuClock, rtc_cntl::Rtc, timer::timg::TimerGroup};
use log::{LevelFilter, error, info, warn};
use static_cell::StaticCell;

const STATUS_POLL_INTERVAL_MS: u64 = 250;
const CLOCK_REPORT_INTERVAL_SECS: u64 = 60;

const WIFI_SSID: &str = env!(
    "CHRONOLINK_WIFI_SSID",
    "Set CHRONOLINK_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "CHRONOLINK_WIFI_PASSWORD",
    "Set CHRONOLINK_WIFI_PASSWORD in your environment before building/flashing."
);
const BUILD_OPTIONS: BuildOptions<'static> = BuildOptions {
    ssid: WIFI_SSID,
    password: WIFI_PASSWORD,
    auth_floor: option_env!("CHRONOLINK_WIFI_AUTH_FLOOR"),
    sae_mode: option_env!("CHRONOLINK_WIFI_SAE_MODE"),
    sae_identifier: option_env!("CHRONOLINK_WIFI_SAE_ID"),
    max_retries: option_env!("CHRONOLINK_WIFI_MAX_RETRY"),
    join_wait_ms: option_env!("CHRONOLINK_WIFI_JOIN_WAIT_MS"),
    time_server: option_env!("CHRONOLINK_SNTP_SERVER"),
};

static LINK_EVENTS: LinkEventQueue = LinkEventQueue::new();
static JOIN_STATUS: JoinStatusHandle = JoinStatusHandle::new();
static SNTP_CONTROL: SntpControl = SntpControl::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

async fn park() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: chronolink starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let rtc = Rtc::new(peripherals.LPWR);

    let (join_config, time_config) = match BUILD_OPTIONS.resolve() {
        Ok(resolved) => resolved,
        Err(err) => {
            error!(
                "config rejected: {:?} (status={})",
                err,
                Status::from(err).as_str()
            );
            park().await
        }
    };
    info!(
        "config: ssid={} auth_floor={} max_retries={} join_wait_ms={} sntp_server={}",
        join_config.ssid(),
        join_config.auth_floor().as_str(),
        join_config.max_retries(),
        join_config.wait_timeout_ms(),
        time_config.server()
    );

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            error!("esp-radio init failed: {:?}", err);
            park().await
        }
    };

    let (wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                error!("wifi peripheral init failed: {:?}", err);
                park().await
            }
        };

    // Handlers must be in place before the driver starts.
    install_link_event_bridge(&LINK_EVENTS);
    let mut station = EspStation::new(wifi_controller);

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x5A17_2B34_D099_EE11,
    );

    let clock = RtcWallClock::new(&rtc);
    let sntp_runner = SntpRunner::new(stack, &rtc, &SNTP_CONTROL);
    let mut synchronizer =
        TimeSynchronizer::new(SntpClient::new(&SNTP_CONTROL), clock, time_config);
    let mut controller = ConnectionController::new(&LINK_EVENTS, &JOIN_STATUS);
    let mut pause = EmbassyPause;

    let net_future = net_runner.run();
    let ipv4_future = watch_ipv4(stack, &LINK_EVENTS);
    let sntp_future = sntp_runner.run();
    let bring_up_future = async {
        let report = match bring_up(
            &mut controller,
            &mut station,
            &join_config,
            &mut synchronizer,
            &mut pause,
        )
        .await
        {
            Ok(report) => report,
            Err(err) => {
                error!(
                    "wifi start-up failed: {:?} (status={})",
                    err,
                    err.status().as_str()
                );
                park().await
            }
        };

        let status = report.status();
        match report.synced_time() {
            Some(now) if status.is_success() => {
                info!("bring-up complete: {} (status={})", now, status.as_str())
            }
            _ => warn!(
                "bring-up incomplete: join={:?} status={} code={:#010x}",
                report.join,
                status.as_str(),
                status.code()
            ),
        }

        loop {
            Timer::after_secs(CLOCK_REPORT_INTERVAL_SECS).await;
            info!(
                "clock: {} (station_connected={})",
                clock.now(),
                station.is_connected()
            );
        }
    };
    let status_future = async {
        let mut last_revision = u32::MAX;
        loop {
            let snapshot = JOIN_STATUS.snapshot();
            if snapshot.revision != last_revision {
                last_revision = snapshot.revision;
                info!(
                    "join status: state={:?} outcome={:?} retries={} address={:?} rev={}",
                    snapshot.state,
                    snapshot.outcome(),
                    snapshot.retries,
                    snapshot.address,
                    snapshot.revision
                );
            }
            Timer::after_millis(STATUS_POLL_INTERVAL_MS).await;
        }
    };

    let _ = embassy_futures::join::join5(
        net_future,
        ipv4_future,
        sntp_future,
        bring_up_future,
        status_future,
    )
    .await;
    unreachable!()
}
