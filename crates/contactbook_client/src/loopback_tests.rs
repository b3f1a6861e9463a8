/* 📖 # Loopback tests

These run the real tiny_http server on an OS-assigned loopback port and drive it with
the reqwest client, so both ends of the wire format are checked together.
*/

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use contactbook_base::pal::http::{HttpServerConfig, HttpServerHandle};
    use contactbook_base::{ErrorKind, Pal, RealPal};
    use contactbook_engine::{
        ApiService, ContactId, ContactService, NewContact, SqliteStore, StoreHandle,
    };

    use crate::api::{ContactApi, HttpContactApi};
    use crate::book::ContactBook;
    use crate::validation::ContactForm;

    fn start_server() -> (HttpServerHandle, HttpContactApi) {
        let store = StoreHandle::new(SqliteStore::open_in_memory().unwrap());
        let service = ApiService::new(ContactService::new(store));
        let pal = RealPal::new(PathBuf::from("."));
        let handle = pal
            .start_http_server(Box::new(service), HttpServerConfig::default())
            .unwrap();
        let api = HttpContactApi::new(format!("http://127.0.0.1:{}", handle.port())).unwrap();
        (handle, api)
    }

    fn new_contact(name: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "1234567890".to_string(),
        }
    }

    #[test]
    fn test_create_list_delete_over_http() {
        let (handle, api) = start_server();

        let created = api.create(&new_contact("Ada")).unwrap();
        assert_eq!(created.name, "Ada");

        let page = api.list(1, 10).unwrap();
        assert_eq!(page.contacts, vec![created.clone()]);
        assert_eq!(page.pagination.total_contacts, 1);

        api.delete(&created.id).unwrap();
        let error = api.delete(&created.id).unwrap_err();
        match error.kind() {
            ErrorKind::NotFound { what } => assert_eq!(what, "Contact not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }

        handle.shutdown();
        handle.wait();
    }

    #[test]
    fn test_server_validation_message_reaches_the_client() {
        let (_handle, api) = start_server();
        let error = api.create(&new_contact("")).unwrap_err();
        match error.kind() {
            ErrorKind::Validation { message } => assert_eq!(message, "All fields are required"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_with_unusual_id_is_encoded() {
        let (_handle, api) = start_server();
        let error = api
            .delete(&ContactId::from_string("a/b c?d"))
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::NotFound { .. }), "{:?}", error);
    }

    #[test]
    fn test_contact_book_pages_through_live_server() {
        let (_handle, api) = start_server();
        for i in 0..15 {
            api.create(&new_contact(&format!("P{}", i))).unwrap();
        }

        let mut book = ContactBook::new(api);
        assert!(book.refresh());
        assert_eq!(book.status_line().unwrap(), "Page 1 of 2 (15 contacts)");

        assert!(book.next_page());
        assert_eq!(book.contacts().len(), 5);
        assert!(!book.can_go_next());

        let submitted = book.submit(&ContactForm::new("Zed", "zed@example.com", "0987654321"));
        assert!(matches!(submitted, crate::book::SubmitOutcome::Created(_)));
        assert_eq!(book.contacts().len(), 6);
        assert!(book.take_notices().is_empty());
    }
}
