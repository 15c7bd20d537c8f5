// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// A value that can be stored in a [`Cache`][crate::Cache].
///
/// The cache never inspects stored values: it does not compare, hash, weigh or evict them. The
/// only capability it asks for is a textual rendering, which is used to emit an entry in
/// diagnostics (see [`Cache::render`][crate::Cache::render]).
///
/// # Examples
///
/// ```
/// use ringshard::{Cache, Cacheable};
///
/// struct Temperature(f32);
///
/// impl Cacheable for Temperature {
///     fn render(&self) -> String {
///         format!("{:.1}°C", self.0)
///     }
/// }
///
/// let cache = Cache::<Temperature>::new(4);
/// cache.set("lab", Temperature(21.5));
/// assert_eq!(cache.render("lab").as_deref(), Some("21.5°C"));
/// ```
pub trait Cacheable {
    /// Returns the textual representation of the value.
    fn render(&self) -> String;
}

impl Cacheable for String {
    fn render(&self) -> String {
        self.clone()
    }
}
