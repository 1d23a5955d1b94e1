/*!
 * Identity extractor
 *
 * Responsibility:
 * - pipeline が bind した UserContext を handler に渡す
 */
mod current_user;
mod maybe_user;

pub use current_user::CurrentUser;
pub use maybe_user::MaybeUser;
