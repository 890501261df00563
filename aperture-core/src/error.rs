use thiserror::Error;

/// A referenced entity does not exist.
///
/// Terminal for the request; the transport layer maps each variant to a
/// not-found outcome naming the entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("account not found")]
    Account,

    #[error("rating not found")]
    Rating,

    #[error("tag not found")]
    Tag,

    #[error("image not found")]
    Image,
}

/// Client input rejected before any write happened.
///
/// These surface as bad-request outcomes carrying the specific reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a rating must select exactly one star value")]
    RatingSelectionInvalid,

    #[error("a rating for this image by this user already exists")]
    DuplicateRating,

    #[error("an image cannot be rated by its owner")]
    OwnRating,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("username cannot be empty")]
    UsernameEmpty,

    #[error("password too short: minimum 8 characters required")]
    PasswordTooShort,

    #[error("a tag with this name already exists")]
    TagNameTaken,
}
