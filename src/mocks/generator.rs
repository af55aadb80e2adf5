use std::collections::HashSet;

use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use time::{Duration, OffsetDateTime};

use crate::error::ApiError;
use crate::pets::repo::NewPet;
use crate::sessions::password::hash_password;
use crate::users::repo::NewUser;
use crate::validation::Species;

/// Every generated user gets this password.
pub const MOCK_PASSWORD: &str = "coder123";

const ROLES: &[&str] = &["user", "admin"];

const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "hotmail.com",
    "yahoo.com",
    "outlook.com",
    "correo.com",
    "email.com",
    "test.com",
];

const PET_NAMES: &[&str] = &[
    "Firulais", "Michi", "Rocky", "Luna", "Toby", "Nala", "Simba", "Coco", "Max", "Pelusa",
];

const DOG_IMAGES: &[&str] = &[
    "https://images.dog.ceo/breeds/retriever-golden/n02099601_100.jpg",
    "https://images.dog.ceo/breeds/beagle/n02088364_1108.jpg",
    "https://images.dog.ceo/breeds/bulldog-french/n02108915_1123.jpg",
];

const CAT_IMAGES: &[&str] = &[
    "https://cdn2.thecatapi.com/images/0XYvRd7oD.jpg",
    "https://cdn2.thecatapi.com/images/MTY3ODIyMQ.jpg",
    "https://cdn2.thecatapi.com/images/bpc.jpg",
];

const DEFAULT_IMAGES: &[&str] = &[
    "https://via.placeholder.com/300x300/FF6B6B/FFFFFF?text=Mascota",
    "https://via.placeholder.com/300x300/4ECDC4/FFFFFF?text=Pet",
    "https://via.placeholder.com/300x300/45B7D1/FFFFFF?text=Animal",
];

/// Generates `count` synthetic users with unique emails. The fixed password
/// is hashed once and shared across the batch; hashing per user would make a
/// 50-user request crawl.
pub fn generate_users(count: usize) -> Result<Vec<NewUser>, ApiError> {
    let password_hash = hash_password(MOCK_PASSWORD)?;
    let mut rng = rand::thread_rng();
    let mut taken = HashSet::new();
    let mut users = Vec::with_capacity(count);

    for _ in 0..count {
        let first_name: String = FirstName(EN).fake();
        let last_name: String = LastName(EN).fake();
        let email = unique_email(&first_name, &last_name, &mut taken, &mut rng);
        users.push(NewUser {
            first_name,
            last_name,
            email,
            password_hash: password_hash.clone(),
            role: ROLES.choose(&mut rng).copied().unwrap_or("user").to_string(),
        });
    }

    Ok(users)
}

/// Generates `count` synthetic unadopted pets with birth dates between six
/// months and ten years in the past.
pub fn generate_pets(count: usize) -> Vec<NewPet> {
    let mut rng = rand::thread_rng();
    let mut pets = Vec::with_capacity(count);

    for _ in 0..count {
        let species = *Species::ALL.choose(&mut rng).unwrap_or(&Species::Otro);
        let age_days = rng.gen_range(183..=3650);
        let images = match species {
            Species::Perro => DOG_IMAGES,
            Species::Gato => CAT_IMAGES,
            _ => DEFAULT_IMAGES,
        };
        pets.push(NewPet {
            name: PET_NAMES.choose(&mut rng).copied().unwrap_or("Bobby").to_string(),
            species: species.to_string(),
            birth_date: OffsetDateTime::now_utc() - Duration::days(age_days),
            image: images.choose(&mut rng).map(|s| s.to_string()),
        });
    }

    pets
}

/// Drops generated users whose email is already registered, so persisting a
/// batch stays re-runnable instead of aborting halfway through.
pub fn skip_existing(batch: Vec<NewUser>, existing: &HashSet<String>) -> Vec<NewUser> {
    batch
        .into_iter()
        .filter(|user| !existing.contains(&user.email))
        .collect()
}

fn unique_email(
    first_name: &str,
    last_name: &str,
    taken: &mut HashSet<String>,
    rng: &mut impl Rng,
) -> String {
    let domain = EMAIL_DOMAINS.choose(rng).copied().unwrap_or("test.com");
    let local = format!("{}.{}", email_token(first_name), email_token(last_name));
    let mut email = format!("{local}@{domain}");
    let mut counter = 1;
    while !taken.insert(email.clone()) {
        email = format!("{local}{counter}@{domain}");
        counter += 1;
    }
    email
}

fn email_token(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or("x")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{is_valid_birth_date, is_valid_email};
    use std::str::FromStr;

    #[test]
    fn generates_the_requested_number_of_users_with_unique_emails() {
        let users = generate_users(50).expect("generate");
        assert_eq!(users.len(), 50);
        let emails: HashSet<_> = users.iter().map(|u| u.email.clone()).collect();
        assert_eq!(emails.len(), 50);
        for user in &users {
            assert!(is_valid_email(&user.email), "bad email: {}", user.email);
            assert!(user.role == "user" || user.role == "admin");
            assert!(user.password_hash.starts_with("$argon2"));
        }
    }

    #[test]
    fn generated_pets_have_valid_species_and_past_birth_dates() {
        let pets = generate_pets(50);
        assert_eq!(pets.len(), 50);
        for pet in &pets {
            assert!(Species::from_str(&pet.species).is_ok(), "bad species: {}", pet.species);
            assert!(is_valid_birth_date(pet.birth_date));
            assert!(pet.image.is_some());
        }
    }

    #[test]
    fn skip_existing_drops_only_colliding_emails() {
        let batch = generate_users(10).expect("generate");
        let existing: HashSet<String> =
            [batch[0].email.clone(), batch[4].email.clone()].into();
        let kept = skip_existing(batch.clone(), &existing);
        assert_eq!(kept.len(), 8);
        for user in &kept {
            assert!(!existing.contains(&user.email));
        }
        // An empty collision set keeps the whole batch.
        assert_eq!(skip_existing(batch, &HashSet::new()).len(), 10);
    }

    #[test]
    fn email_token_strips_spaces_and_punctuation() {
        assert_eq!(email_token("Mary Jane"), "mary");
        assert_eq!(email_token("O'Brien"), "obrien");
    }
}
