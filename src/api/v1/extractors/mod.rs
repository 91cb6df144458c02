/*!
 * Request extractors
 *
 * Public API:
 * - Authorized: claims of a request that passed the permission layer
 */
mod authorized;

pub use authorized::Authorized;
