/* 📖 # Why use a separate file for these error tests?

The span trace tests install a global tracing subscriber. Keeping them apart from the
error module keeps the module itself readable and groups the subscriber setup in one place.
*/

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{ContactbookError, ContactbookResult, ResultExt};
    use expect_test::expect;
    use std::error::Error;
    use std::io;
    use std::path::PathBuf;
    use tracing::span;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    /// Set up tracing with ErrorLayer for tests.
    /// Uses `try_init()` to handle multiple tests running concurrently.
    fn setup_tracing_subscriber() {
        let _ = tracing_subscriber::registry()
            .with(ErrorLayer::default())
            .try_init();
    }

    #[test]
    fn test_validation_kind_is_preserved() {
        let error = ContactbookError::validation("All fields are required");
        match error.kind() {
            ErrorKind::Validation { message } => assert_eq!(message, "All fields are required"),
            other => panic!("Expected Validation variant, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_display() {
        let error = ContactbookError::not_found("contact abc");
        assert_eq!(error.to_string(), "Not found: contact abc");
    }

    #[test]
    fn test_duplicate_key_display() {
        let error = ContactbookError::duplicate_key("abc");
        assert_eq!(error.to_string(), "Duplicate key: abc");
    }

    #[test]
    fn test_storage_error_exposes_source() {
        let io_err = io::Error::other("disk on fire");
        let error = ContactbookError::storage("count contacts", io_err);

        assert_eq!(
            error.to_string(),
            "Storage failure: count contacts: disk on fire"
        );
        assert_eq!(error.source().unwrap().to_string(), "disk on fire");
        assert_eq!(error.root_cause().to_string(), "disk on fire");
    }

    #[test]
    fn test_file_error_display() {
        let error = ContactbookError::new(ErrorKind::FileError {
            path: PathBuf::from("/tmp/contactbook.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        });
        let display = error.to_string();
        assert!(display.contains("/tmp/contactbook.toml"));
        assert!(display.contains("not found"));
    }

    #[test]
    fn test_display_with_multiple_contexts() {
        let error = ContactbookError::message("root error")
            .context("first")
            .context("second");
        assert_eq!(error.to_string(), "first: second: root error");
        assert_eq!(error.get_context(), ["first", "second"]);
    }

    #[test]
    fn test_with_context_is_lazy_on_success() {
        let result: ContactbookResult<i32> = Ok(42);
        let final_result = result.with_context(|| panic!("must not be evaluated"));
        assert_eq!(final_result.unwrap(), 42);
    }

    #[test]
    fn test_result_ext_chaining() {
        let result: ContactbookResult<i32> = Err(Box::new(ContactbookError::message("root")));
        let err = result
            .context("step 1")
            .with_context(|| "step 2".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "step 1: step 2: root");
    }

    #[test]
    fn test_err_macro_formats_message() {
        let error: Box<ContactbookError> = crate::err!("port {} unavailable", 3000);
        assert_eq!(error.to_string(), "port 3000 unavailable");
    }

    #[test]
    fn test_cause_is_the_source() {
        let inner = ContactbookError::message("inner");
        let outer = ContactbookError::message("outer").caused_by(inner);
        assert_eq!(outer.source().unwrap().to_string(), "inner");
        assert_eq!(outer.root_cause().to_string(), "inner");
    }

    #[test]
    fn test_debug_tree_without_spans() {
        let inner = ContactbookError::message("inner error").context("inner context");
        let outer = ContactbookError::message("outer error")
            .context("outer context")
            .caused_by(inner);

        expect![[r#"
            outer error
            ├─ outer context
            └─ cause: inner error
               └─ inner context
        "#]]
        .assert_eq(&format!("{:?}", outer));
    }

    #[test]
    fn test_debug_includes_span_trace() {
        setup_tracing_subscriber();

        let operation_span = span!(tracing::Level::DEBUG, "insert_contact", attempt = 1);
        let _guard = operation_span.enter();

        let error = ContactbookError::duplicate_key("abc").context("creating contact");
        let debug = format!("{:?}", error);

        assert!(debug.starts_with("Duplicate key: abc\n└─ creating contact\n"));
        assert!(debug.contains("Trace:"));
        assert!(debug.contains("insert_contact"));
        assert!(debug.contains("attempt=1"));
    }
}
