//! Process-wide error funnels.
//!
//! Panics (the fatal path) and failed background tasks (the non-fatal path)
//! both funnel into the [`ErrorReportStore`] so recurring failures show up
//! in `/errors` with occurrence counts, alongside their normal tracing
//! output.

use tracing::error;

use crate::report::{ErrorContext, ErrorReportStore};

/// Installs a panic hook that funnels panics through the store.
///
/// The previous hook still runs afterwards, so default backtrace printing
/// (and the process-fatal behavior the binary chooses) is preserved.
pub fn install_panic_hook(store: ErrorReportStore) {
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());

        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());

        error!(location = %location, message = %message, "uncaught panic");

        store.handle(
            "Panic",
            message,
            ErrorContext::new("process", "panic").meta("location", location),
        );

        previous(info);
    }));
}

/// Reports a failed background task without aborting anything.
///
/// The analogue of an unhandled rejection: logged and tracked, but the
/// process continues.
pub fn report_task_failure(
    store: &ErrorReportStore,
    service: &str,
    operation: &str,
    err: &(dyn std::error::Error + 'static),
) {
    error!(service, operation, error = %err, "background task failed");
    store.handle(
        "TaskFailure",
        err.to_string(),
        ErrorContext::new(service, operation),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportFilter;

    #[test]
    fn task_failure_is_recorded() {
        let store = ErrorReportStore::new();
        let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");

        report_task_failure(&store, "notify", "drain", &err);
        report_task_failure(&store, "notify", "drain", &err);

        let reports = store.list(&ReportFilter::default(), 10);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].occurrences, 2);
        assert_eq!(reports[0].kind, "TaskFailure");
    }
}
