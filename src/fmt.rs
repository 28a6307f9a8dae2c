//! Internal logging macros.
//!
//! Forward to `defmt` on target and to `log` on the host. With neither
//! backend enabled the arguments are evaluated and dropped.
//!
//! Format strings must stay within the subset both backends accept: `{}`
//! and the hex hints `{:X}` / `{:02X}`, over primitives and `&str`. Inline
//! named arguments such as `{value}` are not accepted by `defmt`.

#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::trace!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::trace!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::debug!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::debug!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ($($arg)*);
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::info!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::info!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::warn!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::warn!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ($($arg)*);
    }};
}

macro_rules! error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::error!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::error!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "embedded")))]
        let _ = ($($arg)*);
    }};
}
