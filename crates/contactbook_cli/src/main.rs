/* 📖 # Why is the CLI minimal and hardcoded?

The CLI has no argument parser. The first argument picks a command and the rest are
positional:

- `contactbook` or `contactbook serve` runs the HTTP server using `contactbook.toml`
  from the working directory (defaults when absent) plus the `PORT` and
  `CONTACTBOOK_DATABASE` overrides
- `contactbook list [page]` prints one page of contacts
- `contactbook add <name> <email> <phone>` validates and adds a contact
- `contactbook delete <id>` removes a contact

The client commands talk to the server named by `CONTACTBOOK_URL`.

Exit codes:
- 0: Success
- 1: Error (bad arguments, configuration, storage or server failure)
*/

use std::env;
use std::path::Path;
use std::process;

use contactbook_base::tracing::init_tracing;
use contactbook_base::{ContactbookResult, PalHandle, RealPal, err};
use contactbook_client::{
    ContactBook, ContactForm, DEFAULT_URL, FieldErrors, HttpContactApi, SubmitOutcome, URL_ENV,
};
use contactbook_engine::{
    ApiService, CONFIG_FILE_NAME, ContactId, ContactService, SqliteStore, StoreHandle,
    load_config,
};
use tracing::info;

const USAGE: &str =
    "Usage: contactbook [serve | list [page] | add <name> <email> <phone> | delete <id>]";

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = match args.as_slice() {
        [] | ["serve"] => serve(),
        ["list"] => list("1"),
        ["list", page] => list(page),
        ["add", name, email, phone] => add(name, email, phone),
        ["delete", id] => delete(id),
        _ => Err(err!("{}", USAGE)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn serve() -> ContactbookResult<()> {
    let current_dir =
        env::current_dir().map_err(|e| err!("Failed to get current directory: {}", e))?;
    let pal = PalHandle::new(RealPal::new(current_dir.clone()));

    let config = load_config(&pal, Path::new(CONFIG_FILE_NAME))?
        .with_env_overrides(|key| env::var(key).ok())?;

    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        pal.create_directory_all(parent)?;
    }
    let store = SqliteStore::open(&current_dir.join(&config.database))?;
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database.display(),
        "starting contact server"
    );
    let service = ApiService::new(ContactService::new(StoreHandle::new(store)));

    let handle = pal.start_http_server(Box::new(service), config.server_config())?;
    println!("Server running on port {}", handle.port());
    handle.wait();
    Ok(())
}

fn book() -> ContactbookResult<ContactBook<HttpContactApi>> {
    let url = env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_URL.to_string());
    Ok(ContactBook::new(HttpContactApi::new(url)?))
}

fn list(page: &str) -> ContactbookResult<()> {
    let page: u64 = page
        .parse()
        .map_err(|_| err!("Page must be a positive number, got {:?}", page))?;
    let mut book = book()?;
    if !book.go_to_page(page) {
        return Err(failure(&mut book));
    }
    print_page(&book);
    Ok(())
}

fn add(name: &str, email: &str, phone: &str) -> ContactbookResult<()> {
    let mut book = book()?;
    match book.submit(&ContactForm::new(name, email, phone)) {
        SubmitOutcome::Created(contact) => {
            println!("Added {} ({})", contact.name, contact.id);
            Ok(())
        }
        SubmitOutcome::Invalid => {
            print_field_errors(book.field_errors());
            Err(err!("Contact was not added"))
        }
        SubmitOutcome::Failed => Err(failure(&mut book)),
    }
}

fn delete(id: &str) -> ContactbookResult<()> {
    let mut book = book()?;
    if !book.delete(&ContactId::from_string(id)) {
        return Err(failure(&mut book));
    }
    println!("Deleted {}", id);
    Ok(())
}

fn failure(book: &mut ContactBook<HttpContactApi>) -> Box<contactbook_base::ContactbookError> {
    err!("{}", book.take_notices().join("; "))
}

fn print_page(book: &ContactBook<HttpContactApi>) {
    for contact in book.contacts() {
        println!(
            "{}  {}  {}  {}",
            contact.id, contact.name, contact.email, contact.phone
        );
    }
    if let Some(status) = book.status_line() {
        println!("{}", status);
    }
}

fn print_field_errors(errors: &FieldErrors) {
    for (field, message) in [
        ("name", errors.name),
        ("email", errors.email),
        ("phone", errors.phone),
    ] {
        if let Some(message) = message {
            eprintln!("  {}: {}", field, message);
        }
    }
}
