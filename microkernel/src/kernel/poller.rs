//! # Readiness Polling
//!
//! The event loop blocks in exactly one place: [`Poller::wait`]. A poller is
//! handed a snapshot of the watch table and a timeout, and reports which
//! entries became ready. Timers are not the poller's concern; the runtime
//! shortens the timeout to the next timer deadline.
//!
//! - [`PollPoller`] (unix): `poll(2)` over the watched descriptors.
//! - [`SleepPoller`]: no descriptor support, only sleeps. Used where no
//!   descriptor readiness API is available.

use std::io;
use std::time::Duration;

use microkernel_api::types::Interest;

use crate::kernel::watch::Watch;

/// A ready entry of the snapshot passed to [`Poller::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    /// Index into the snapshot.
    pub index: usize,
    pub events: Interest,
}

pub trait Poller {
    /// Blocks for at most `timeout` or until one of `watches` is ready, and
    /// appends the ready entries to `ready`. An interrupted wait returns
    /// `Ok` with nothing appended.
    fn wait(&mut self, watches: &[Watch], timeout: Duration, ready: &mut Vec<Readiness>) -> io::Result<()>;
}

/// Poller used by [`Runtime::new`](crate::kernel::runtime::Runtime::new).
pub fn default_poller() -> Box<dyn Poller> {
    #[cfg(unix)]
    {
        Box::new(PollPoller::new())
    }
    #[cfg(not(unix))]
    {
        Box::new(SleepPoller)
    }
}

#[cfg(unix)]
pub use unix::PollPoller;

#[cfg(unix)]
mod unix {
    use super::*;

    fn to_poll_events(interest: Interest) -> libc::c_short {
        let mut events = 0;
        if interest.is_readable() {
            events |= libc::POLLIN;
        }
        if interest.is_writable() {
            events |= libc::POLLOUT;
        }
        events
    }

    fn from_poll_events(revents: libc::c_short) -> Interest {
        let mut interest = Interest::NONE;
        if revents & libc::POLLIN != 0 {
            interest |= Interest::READABLE;
        }
        if revents & libc::POLLOUT != 0 {
            interest |= Interest::WRITABLE;
        }
        if revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
            interest |= Interest::ERROR;
        }
        if revents & libc::POLLHUP != 0 {
            interest |= Interest::HANGUP;
        }
        interest
    }

    fn timeout_millis(timeout: Duration) -> libc::c_int {
        // Round up so a sub-millisecond deadline does not turn into a busy loop.
        let ms = timeout.as_nanos().div_ceil(1_000_000);
        libc::c_int::try_from(ms).unwrap_or(libc::c_int::MAX)
    }

    /// `poll(2)` based poller.
    #[derive(Debug, Default)]
    pub struct PollPoller {
        fds: Vec<libc::pollfd>,
    }

    impl PollPoller {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Poller for PollPoller {
        fn wait(&mut self, watches: &[Watch], timeout: Duration, ready: &mut Vec<Readiness>) -> io::Result<()> {
            self.fds.clear();
            self.fds.extend(watches.iter().map(|w| libc::pollfd {
                fd: w.fd,
                events: to_poll_events(w.interest),
                revents: 0,
            }));

            // SAFETY: `fds` points to `fds.len()` initialized pollfd structs
            // that stay alive and unaliased for the duration of the call.
            let rc = unsafe {
                libc::poll(
                    self.fds.as_mut_ptr(),
                    self.fds.len() as libc::nfds_t,
                    timeout_millis(timeout),
                )
            };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    return Ok(());
                }
                return Err(err);
            }

            for (index, pfd) in self.fds.iter().enumerate() {
                if pfd.revents != 0 {
                    ready.push(Readiness {
                        index,
                        events: from_poll_events(pfd.revents),
                    });
                }
            }
            Ok(())
        }
    }

}

/// Poller without descriptor support.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepPoller;

impl Poller for SleepPoller {
    fn wait(&mut self, watches: &[Watch], timeout: Duration, _ready: &mut Vec<Readiness>) -> io::Result<()> {
        if !watches.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "descriptor watches are not supported by this poller",
            ));
        }
        if !timeout.is_zero() {
            std::thread::sleep(timeout);
        }
        Ok(())
    }
}
