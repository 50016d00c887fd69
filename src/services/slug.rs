use anyhow::Result;
use rand::Rng;
use slug::slugify;

const RANDOM_SLUG_LEN: usize = 10;

pub fn generate_slug(title: &str) -> String {
    slugify(title)
}

/// Fallback identifier for titles with no sluggable characters.
pub fn random_slug() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..RANDOM_SLUG_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > 255 {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Derives a unique slug for `title`, probing storage through `taken`.
///
/// The base candidate is the slugified title, or a random token when the
/// title has nothing to slugify. On collision the counter suffix is appended
/// to the base (`my-post`, `my-post-1`, `my-post-2`, ...) until `taken`
/// reports a free candidate. The probe-then-insert window is not atomic;
/// a concurrent insert of the same candidate surfaces at the unique index.
pub fn assign_slug<F>(title: &str, mut taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    let base = {
        let s = generate_slug(title);
        if s.is_empty() {
            random_slug()
        } else {
            s
        }
    };

    let mut candidate = base.clone();
    let mut counter = 1u32;
    while taken(&candidate)? {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }

    Ok(candidate)
}
