//! Demo data for local runs.

use std::sync::Arc;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use lms_db::{BookRepository, Database, LibraryRepository, PatronRepository, Session};
use lms_domain::{Book, Library, Patron};
use lms_kernel::settings::SeedSettings;

const LIBRARIES: &[&str] = &["Central Library", "Westside Library", "Eastside Library"];
const PATRONS: &[&str] = &["John Doe", "Jane Smith", "Alice Johnson", "Bob Brown"];

const MODELS: &[&str] = &[
    "Civic", "Golf", "Corolla", "Mustang", "Beetle", "Accord", "Focus", "Impala", "Camry",
    "Fiesta", "Jetta", "Charger", "Model S", "Prius", "Outback", "Wrangler",
];
const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Frances", "Ken", "Margaret", "Niklaus",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Allen", "Thompson",
    "Hamilton", "Wirth",
];
const GENRES: &[&str] = &[
    "lorem", "ipsum", "dolor", "amet", "tempora", "quia", "velit", "magnam", "aut", "modi",
];

/// What a seeding run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub skipped: bool,
    pub libraries: usize,
    pub patrons: usize,
    pub books: usize,
    pub checkouts: usize,
}

/// Fills an empty store with libraries, patrons, random books and a few
/// checkouts. Does nothing once any book exists.
pub struct FakeDataSeeder<D: Database> {
    db: Arc<D>,
    settings: SeedSettings,
}

impl<D: Database> FakeDataSeeder<D> {
    pub fn new(db: Arc<D>, settings: SeedSettings) -> Self {
        Self { db, settings }
    }

    pub async fn seed(&self) -> anyhow::Result<SeedReport> {
        self.seed_with(&mut StdRng::from_entropy()).await
    }

    pub async fn seed_with<R: Rng + Send>(&self, rng: &mut R) -> anyhow::Result<SeedReport> {
        let mut session = self.db.begin().await?;
        if !session.get_books().await?.is_empty() {
            tracing::info!("store already holds books, skipping seed");
            return Ok(SeedReport {
                skipped: true,
                ..SeedReport::default()
            });
        }

        let mut libraries: Vec<Library> = LIBRARIES
            .iter()
            .map(|name| Library::new(session.next_library_id(), *name))
            .collect();
        let mut patrons: Vec<Patron> = PATRONS
            .iter()
            .map(|name| Patron::new(session.next_patron_id(), *name))
            .collect();

        for _ in 0..self.settings.books {
            let library = libraries
                .choose_mut(rng)
                .context("no library to seed books into")?;
            let isbn = loop {
                let candidate = random_isbn(rng);
                if library.book(&candidate).is_none() {
                    break candidate;
                }
            };
            let book = Book::new(
                session.next_book_id(),
                random_title(rng),
                random_author(rng),
                pick(rng, GENRES),
                isbn,
                library.id(),
            );
            library.add_book(book)?;
        }

        let mut checkouts = 0;
        for patron in &mut patrons {
            let mut available: Vec<(usize, String)> = libraries
                .iter()
                .enumerate()
                .flat_map(|(index, library)| {
                    library
                        .books()
                        .filter(|book| book.is_available())
                        .map(move |book| (index, book.isbn().to_string()))
                })
                .collect();
            available.shuffle(rng);

            for (index, isbn) in available.into_iter().take(self.settings.checkouts_per_patron) {
                libraries[index].checkout_book(&isbn, patron)?;
                checkouts += 1;
            }
        }

        let report = SeedReport {
            skipped: false,
            libraries: libraries.len(),
            patrons: patrons.len(),
            books: self.settings.books,
            checkouts,
        };

        for library in libraries {
            session.add_library(library).await?;
        }
        for patron in patrons {
            session.add_patron(patron).await?;
        }
        session.commit().await?;

        tracing::info!(
            libraries = report.libraries,
            patrons = report.patrons,
            books = report.books,
            checkouts = report.checkouts,
            "seed data written"
        );
        Ok(report)
    }
}

fn pick<R: Rng>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

fn random_title<R: Rng>(rng: &mut R) -> String {
    [pick(rng, MODELS), pick(rng, MODELS), pick(rng, MODELS)].join(" ")
}

fn random_author<R: Rng>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

/// Ten random digits.
fn random_isbn<R: Rng>(rng: &mut R) -> String {
    (0..10)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
