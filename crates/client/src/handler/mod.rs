//! The callback seam between the exchange core and an embedding host.
//!
//! The dispatcher hands the final [`ExchangeResult`] to a [`Callback`]
//! exactly once. The trait consumes `self`, so a second invocation is not
//! representable; whatever state the host needs alive for the callback's
//! duration travels inside the callback value itself.

use crate::protocol::ExchangeResult;

/// Receives the single terminal outcome of an exchange.
pub trait Callback {
    fn on_complete(self, result: ExchangeResult);
}

#[derive(Debug)]
pub struct CallbackFn<F> {
    f: F,
}

impl<F> Callback for CallbackFn<F>
where
    F: FnOnce(ExchangeResult),
{
    fn on_complete(self, result: ExchangeResult) {
        (self.f)(result)
    }
}

/// Wraps a closure as a [`Callback`].
pub fn make_callback<F>(f: F) -> CallbackFn<F>
where
    F: FnOnce(ExchangeResult),
{
    CallbackFn { f }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_receives_the_result() {
        let mut delivered = None;
        let callback = make_callback(|result| delivered = Some(result));

        callback.on_complete(ExchangeResult::success("Server: test\r\n".to_string(), "ok".to_string()));

        let result = delivered.unwrap();
        assert!(result.is_success());
        assert_eq!(result.body_text(), "ok");
    }
}
