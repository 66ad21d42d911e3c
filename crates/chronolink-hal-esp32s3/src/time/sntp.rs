//! Polling SNTP client over embassy-net UDP that keeps the RTC set.
//!
//! [`SntpClient`] is the control surface handed to the time synchronizer;
//! [`SntpRunner`] does the network work in its own future and idles while the
//! client is stopped.

use core::{
    cell::RefCell,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::atomic::{AtomicBool, Ordering},
};

use chronolink_core::{config::SERVER_MAX_BYTES, time::TimeSourceClient};
use embassy_futures::select::select;
use embassy_net::{
    IpAddress, IpEndpoint, Stack,
    dns::{self, DnsQueryType},
    udp::{PacketMetadata, UdpSocket},
};
use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    signal::Signal,
};
use embassy_time::{Duration, Timer, with_timeout};
use esp_hal::rtc_cntl::Rtc;
use heapless::String;
use log::{debug, info};
use sntpc::{NtpContext, NtpTimestampGenerator, NtpUdpSocket};

pub const SNTP_PORT: u16 = 123;

const SNTP_REQUEST_TIMEOUT_MS: u64 = 3_000;
const SNTP_RETRY_INTERVAL_MS: u64 = 2_000;
const SNTP_RESYNC_INTERVAL_SECS: u64 = 3_600;
const SNTP_BUFFER_BYTES: usize = 128;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SntpClientError {
    ServerTooLong,
    NoServer,
}

#[derive(Debug)]
enum SntpPollError {
    Dns(dns::Error),
    NoAddress,
    Bind,
    Timeout,
    Protocol(sntpc::Error),
}

/// State shared between [`SntpClient`] and [`SntpRunner`].
pub struct SntpControl {
    running: AtomicBool,
    server: Mutex<CriticalSectionRawMutex, RefCell<String<SERVER_MAX_BYTES>>>,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl SntpControl {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            server: Mutex::new(RefCell::new(String::new())),
            wake: Signal::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn server(&self) -> String<SERVER_MAX_BYTES> {
        self.server.lock(|server| server.borrow().clone())
    }

    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
        self.wake.signal(());
    }
}

impl Default for SntpControl {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SntpClient<'a> {
    control: &'a SntpControl,
}

impl<'a> SntpClient<'a> {
    pub const fn new(control: &'a SntpControl) -> Self {
        Self { control }
    }
}

impl TimeSourceClient for SntpClient<'_> {
    type Error = SntpClientError;

    fn set_server(&mut self, server: &str) -> Result<(), Self::Error> {
        self.control.server.lock(|slot| {
            let mut slot = slot.borrow_mut();
            slot.clear();
            slot.push_str(server)
                .map_err(|()| SntpClientError::ServerTooLong)
        })
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        if self.control.server().is_empty() {
            return Err(SntpClientError::NoServer);
        }
        info!("sntp: polling {}", self.control.server());
        self.control.set_running(true);
        Ok(())
    }

    fn stop(&mut self) {
        self.control.set_running(false);
        debug!("sntp: stopped");
    }
}

/// Performs SNTP exchanges while the client is running and writes the RTC.
pub struct SntpRunner<'a> {
    stack: Stack<'a>,
    rtc: &'a Rtc<'a>,
    control: &'a SntpControl,
}

impl<'a> SntpRunner<'a> {
    pub const fn new(stack: Stack<'a>, rtc: &'a Rtc<'a>, control: &'a SntpControl) -> Self {
        Self {
            stack,
            rtc,
            control,
        }
    }

    pub async fn run(&self) -> ! {
        loop {
            if !self.control.is_running() {
                self.control.wake.wait().await;
                continue;
            }

            let server = self.control.server();
            let next_poll = match self.poll(&server).await {
                Ok(unix_us) => {
                    info!("sntp: clock set from {} (unix_s={})", server, unix_us / 1_000_000);
                    Duration::from_secs(SNTP_RESYNC_INTERVAL_SECS)
                }
                Err(err) => {
                    debug!("sntp: poll of {} failed: {:?}", server, err);
                    Duration::from_millis(SNTP_RETRY_INTERVAL_MS)
                }
            };

            // A stop (or restart) request cuts the wait short.
            select(Timer::after(next_poll), self.control.wake.wait()).await;
        }
    }

    async fn poll(&self, server: &str) -> Result<u64, SntpPollError> {
        let address = self.resolve(server).await?;

        let mut rx_meta = [PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0u8; SNTP_BUFFER_BYTES];
        let mut tx_meta = [PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0u8; SNTP_BUFFER_BYTES];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| SntpPollError::Bind)?;

        let transport = UdpTransport { socket: &socket };
        let context = NtpContext::new(RtcTimestamp::new(self.rtc));
        let target = SocketAddr::V4(SocketAddrV4::new(address, SNTP_PORT));
        let result = with_timeout(
            Duration::from_millis(SNTP_REQUEST_TIMEOUT_MS),
            sntpc::get_time(target, &transport, context),
        )
        .await
        .map_err(|_| SntpPollError::Timeout)?
        .map_err(SntpPollError::Protocol)?;

        let unix_us = u64::from(result.sec()) * 1_000_000 + fraction_to_micros(result.sec_fraction());
        self.rtc.set_current_time_us(unix_us);
        Ok(unix_us)
    }

    async fn resolve(&self, server: &str) -> Result<Ipv4Addr, SntpPollError> {
        if let Ok(address) = server.parse::<Ipv4Addr>() {
            return Ok(address);
        }

        let addresses = self
            .stack
            .dns_query(server, DnsQueryType::A)
            .await
            .map_err(SntpPollError::Dns)?;
        match addresses.first() {
            Some(IpAddress::Ipv4(address)) => Ok(*address),
            #[allow(unreachable_patterns)]
            _ => Err(SntpPollError::NoAddress),
        }
    }
}

// NTP fractions are units of 2^-32 seconds.
fn fraction_to_micros(fraction: u32) -> u64 {
    (u64::from(fraction) * 1_000_000) >> 32
}

struct UdpTransport<'s, 'a> {
    socket: &'s UdpSocket<'a>,
}

impl NtpUdpSocket for UdpTransport<'_, '_> {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> sntpc::Result<usize> {
        let SocketAddr::V4(addr) = addr else {
            return Err(sntpc::Error::Network);
        };
        let endpoint = IpEndpoint::new(IpAddress::Ipv4(*addr.ip()), addr.port());
        self.socket
            .send_to(buf, endpoint)
            .await
            .map_err(|_| sntpc::Error::Network)?;
        Ok(buf.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> sntpc::Result<(usize, SocketAddr)> {
        let (len, meta) = self
            .socket
            .recv_from(buf)
            .await
            .map_err(|_| sntpc::Error::Network)?;
        #[allow(unreachable_patterns)]
        let ip = match meta.endpoint.addr {
            IpAddress::Ipv4(ip) => ip,
            _ => return Err(sntpc::Error::Network),
        };
        Ok((len, SocketAddr::V4(SocketAddrV4::new(ip, meta.endpoint.port))))
    }
}

#[derive(Clone, Copy)]
struct RtcTimestamp<'a> {
    rtc: &'a Rtc<'a>,
    now_us: u64,
}

impl<'a> RtcTimestamp<'a> {
    const fn new(rtc: &'a Rtc<'a>) -> Self {
        Self { rtc, now_us: 0 }
    }
}

impl NtpTimestampGenerator for RtcTimestamp<'_> {
    fn init(&mut self) {
        self.now_us = self.rtc.current_time_us();
    }

    fn timestamp_sec(&self) -> u64 {
        self.now_us / 1_000_000
    }

    fn timestamp_subsec_micros(&self) -> u32 {
        (self.now_us % 1_000_000) as u32
    }
}
