//! Turning clock-chain specifications into parsed tables.
//!
//! Table text comes from a [`ClockTextSource`]; how it was obtained (files,
//! archives, embedded data) is the caller's business. Parsed tables are
//! memoised per [`TableKey`]. Concurrent requests for the same table share a
//! single parse: the first caller parses and publishes, the others block on
//! the same slot and then see the finished table. A failed parse leaves the
//! slot empty, so the next request retries from the text.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::{Lazy, OnceCell};
use tracing::{debug, trace, warn};

use crate::evaluate::ExtrapolationPolicy;
use crate::format::ClockFormat;
use crate::observatory::{ClockLinkSpec, ObservatoryRecord};
use crate::table::{ClockSample, ClockTable};
use crate::{ClockError, ClockResult};

static NOOP_TABLE: Lazy<Arc<ClockTable>> = Lazy::new(|| Arc::new(ClockTable::noop()));

/// Provider of raw clock-file text keyed by source name.
pub trait ClockTextSource: Send + Sync {
    /// Returns the text for `name`, or `Ok(None)` if no such source exists.
    fn read(&self, name: &str) -> ClockResult<Option<Cow<'_, str>>>;
}

impl<S: ClockTextSource + ?Sized> ClockTextSource for Arc<S> {
    fn read(&self, name: &str) -> ClockResult<Option<Cow<'_, str>>> {
        (**self).read(name)
    }
}

impl<S: ClockTextSource + ?Sized> ClockTextSource for &S {
    fn read(&self, name: &str) -> ClockResult<Option<Cow<'_, str>>> {
        (**self).read(name)
    }
}

/// Clock texts held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClockSource {
    texts: HashMap<String, String>,
}

impl InMemoryClockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(name.into(), text.into());
    }

    pub fn with_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InMemoryClockSource {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            texts: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ClockTextSource for InMemoryClockSource {
    fn read(&self, name: &str) -> ClockResult<Option<Cow<'_, str>>> {
        Ok(self.texts.get(name).map(|t| Cow::Borrowed(t.as_str())))
    }
}

/// Clock files under one directory, read on demand.
///
/// Source names are paths relative to the root. Absolute names and names with
/// `..` components are refused so reads stay under the root. A missing file is
/// reported as absent; any other I/O failure is a [`ClockError::Source`].
#[derive(Debug, Clone)]
pub struct DirectoryClockSource {
    root: PathBuf,
}

impl DirectoryClockSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClockTextSource for DirectoryClockSource {
    fn read(&self, name: &str) -> ClockResult<Option<Cow<'_, str>>> {
        let relative = Path::new(name);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(ClockError::source(
                name,
                "source name must be a relative path inside the clock directory",
            ));
        }

        let path = self.root.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                trace!(path = %path.display(), bytes = text.len(), "read clock file");
                Ok(Some(Cow::Owned(text)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClockError::source(name, e.to_string())),
        }
    }
}

/// Cache identity of a parsed table: the source plus the parser applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub source: String,
    pub format: ClockFormat,
    pub site: Option<char>,
}

impl From<&ClockLinkSpec> for TableKey {
    fn from(link: &ClockLinkSpec) -> Self {
        Self {
            source: link.source.clone(),
            format: link.format,
            site: link.site,
        }
    }
}

type TableSlot = Arc<OnceCell<Arc<ClockTable>>>;

#[derive(Debug, Default)]
struct TableCache {
    slots: Mutex<HashMap<TableKey, TableSlot>>,
    parses: AtomicUsize,
}

impl TableCache {
    fn slots(&self) -> MutexGuard<'_, HashMap<TableKey, TableSlot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get_or_parse<F>(&self, key: &TableKey, parse: F) -> ClockResult<Arc<ClockTable>>
    where
        F: FnOnce() -> ClockResult<ClockTable>,
    {
        let slot = Arc::clone(self.slots().entry(key.clone()).or_default());

        if let Some(table) = slot.get() {
            trace!(table = %key.source, "clock table cache hit");
            return Ok(Arc::clone(table));
        }

        slot.get_or_try_init(|| -> ClockResult<Arc<ClockTable>> {
            self.parses.fetch_add(1, Ordering::Relaxed);
            let table = Arc::new(parse()?);
            debug!(
                table = %key.source,
                format = %key.format,
                samples = table.len(),
                "published clock table"
            );
            Ok(table)
        })
        .map(Arc::clone)
    }

    fn published(&self) -> usize {
        self.slots().values().filter(|s| s.get().is_some()).count()
    }

    fn clear(&self) {
        self.slots().clear();
    }
}

/// Optional links appended after a record's own chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceLinks {
    /// GPS → UTC, applied to records with `include_gps`.
    pub gps: Option<ClockLinkSpec>,
    /// TT(TAI) → TT(BIPM), applied to records with `include_bipm`.
    pub bipm: Option<ClockLinkSpec>,
}

/// A chain link bound to its parsed table and effective domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    spec: ClockLinkSpec,
    table: Arc<ClockTable>,
    usable: usize,
    effective_end: Option<f64>,
    policy: ExtrapolationPolicy,
}

impl ResolvedLink {
    /// Applies the link's flags to `table`.
    ///
    /// `bogus_last_correction` removes the final sample and any declared
    /// validity end from the effective domain; the table itself keeps them.
    ///
    /// # Errors
    ///
    /// [`ClockError::UnusableClockTable`] when truncation leaves no samples.
    pub fn new(spec: ClockLinkSpec, table: Arc<ClockTable>) -> ClockResult<Self> {
        let (usable, effective_end) = if table.is_noop() {
            (0, None)
        } else if spec.bogus_last_correction {
            if table.len() < 2 {
                return Err(ClockError::unusable_table(
                    table.name(),
                    "bogus last correction leaves no samples",
                ));
            }
            (table.len() - 1, None)
        } else {
            (table.len(), table.valid_until())
        };

        Ok(Self {
            policy: ExtrapolationPolicy::from_valid_beyond_ends(spec.valid_beyond_ends),
            spec,
            table,
            usable,
            effective_end,
        })
    }

    pub fn spec(&self) -> &ClockLinkSpec {
        &self.spec
    }

    /// The full parsed table, including any sample excluded from evaluation.
    pub fn table(&self) -> &Arc<ClockTable> {
        &self.table
    }

    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    pub fn is_noop(&self) -> bool {
        self.usable == 0
    }

    /// Samples used for interpolation.
    pub fn effective_samples(&self) -> &[ClockSample] {
        &self.table.samples()[..self.usable]
    }

    /// Declared validity end when it extends past the last usable sample.
    pub fn effective_end(&self) -> Option<f64> {
        self.effective_end
    }

    pub fn effective_bounds(&self) -> Option<(f64, f64)> {
        let samples = self.effective_samples();
        let first = samples.first()?.mjd;
        let last = samples.last()?.mjd;
        Some((first, self.effective_end.unwrap_or(last)))
    }
}

/// An observatory's chain with every link bound to its table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChain {
    observatory: String,
    links: Vec<ResolvedLink>,
}

impl ResolvedChain {
    pub fn new(observatory: impl Into<String>, links: Vec<ResolvedLink>) -> Self {
        Self {
            observatory: observatory.into(),
            links,
        }
    }

    pub fn observatory(&self) -> &str {
        &self.observatory
    }

    pub fn links(&self) -> &[ResolvedLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Resolves records' clock chains, parsing each distinct table at most once.
///
/// ```
/// use celestial_clock::{
///     ChainResolver, ClockFormat, ClockLinkSpec, InMemoryClockSource, ObservatoryRecord,
/// };
///
/// let source = InMemoryClockSource::new()
///     .with_text("pks2gps.clk", "# UTC(PKS) UTC(GPS)\n50000 1e-6\n50010 2e-6\n");
/// let resolver = ChainResolver::new(source);
///
/// let parkes = ObservatoryRecord::new("parkes", [-4554231.5, 2816759.1, -3454036.3])?
///     .with_clock_chain(vec![ClockLinkSpec::new("pks2gps.clk", ClockFormat::Tempo2)]);
///
/// let chain = resolver.resolve(&parkes)?;
/// assert_eq!(chain.len(), 1);
/// assert_eq!(resolver.resolve(&parkes)?, chain);
/// assert_eq!(resolver.parse_count(), 1);
/// # Ok::<(), celestial_clock::ClockError>(())
/// ```
#[derive(Debug)]
pub struct ChainResolver<S> {
    source: S,
    cache: TableCache,
    references: ReferenceLinks,
}

impl<S: ClockTextSource> ChainResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: TableCache::default(),
            references: ReferenceLinks::default(),
        }
    }

    pub fn with_gps_link(mut self, link: ClockLinkSpec) -> Self {
        self.references.gps = Some(link);
        self
    }

    pub fn with_bipm_link(mut self, link: ClockLinkSpec) -> Self {
        self.references.bipm = Some(link);
        self
    }

    pub fn with_references(mut self, references: ReferenceLinks) -> Self {
        self.references = references;
        self
    }

    pub fn references(&self) -> &ReferenceLinks {
        &self.references
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The record's own links followed by the reference links it opts into.
    pub fn chain_specs<'a>(&'a self, record: &'a ObservatoryRecord) -> Vec<&'a ClockLinkSpec> {
        let mut specs: Vec<&ClockLinkSpec> = record.clock_chain().iter().collect();
        if record.include_gps() {
            specs.extend(self.references.gps.as_ref());
        }
        if record.include_bipm() {
            specs.extend(self.references.bipm.as_ref());
        }
        specs
    }

    /// Binds every link of `record`'s chain to its table.
    ///
    /// # Errors
    ///
    /// [`ClockError::MissingClockSource`] for an unknown source, any parse
    /// error of a table not yet cached, and
    /// [`ClockError::UnusableClockTable`] from [`ResolvedLink::new`].
    pub fn resolve(&self, record: &ObservatoryRecord) -> ClockResult<ResolvedChain> {
        let links = self
            .chain_specs(record)
            .into_iter()
            .map(|spec| self.resolve_link(record.canonical_id(), spec))
            .collect::<ClockResult<Vec<_>>>()?;

        debug!(
            observatory = record.canonical_id(),
            links = links.len(),
            "resolved clock chain"
        );
        Ok(ResolvedChain::new(record.canonical_id(), links))
    }

    pub fn resolve_link(&self, observatory: &str, spec: &ClockLinkSpec) -> ClockResult<ResolvedLink> {
        let table = self.table(observatory, spec)?;
        ResolvedLink::new(spec.clone(), table)
    }

    /// The parsed table for `spec`, from cache when available.
    pub fn table(&self, observatory: &str, spec: &ClockLinkSpec) -> ClockResult<Arc<ClockTable>> {
        if spec.is_noop() {
            return Ok(Arc::clone(&NOOP_TABLE));
        }

        let key = TableKey::from(spec);
        self.cache.get_or_parse(&key, || {
            let text = self
                .source
                .read(&key.source)?
                .ok_or_else(|| ClockError::missing_clock_source(observatory, &key.source))?;
            let table = key.format.parse(&key.source, &text, key.site)?;
            if table.is_noop() {
                warn!(table = %key.source, "clock file has no samples, treating as no-op");
            }
            Ok(table)
        })
    }

    /// Number of parses performed since construction.
    pub fn parse_count(&self) -> usize {
        self.cache.parses.load(Ordering::Relaxed)
    }

    /// Number of tables currently published in the cache.
    pub fn cached_tables(&self) -> usize {
        self.cache.published()
    }

    /// Drops every cached table. Chains already resolved keep their tables.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKS: &str = "# UTC(PKS) UTC(GPS)\n50000 1e-6\n50010 2e-6\n";
    const GPS: &str = "# UTC(GPS) UTC\n40000 1e-8\n70000 2e-8\n";

    fn tempo2(name: &str) -> ClockLinkSpec {
        ClockLinkSpec::new(name, ClockFormat::Tempo2)
    }

    fn parkes(chain: Vec<ClockLinkSpec>) -> ObservatoryRecord {
        ObservatoryRecord::new("parkes", [0.0, 0.0, 6.4e6])
            .unwrap()
            .with_clock_chain(chain)
    }

    fn source() -> InMemoryClockSource {
        [("pks2gps.clk", PKS), ("gps2utc.clk", GPS)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_empty_chain() {
        let resolver = ChainResolver::new(source());
        let chain = resolver.resolve(&parkes(Vec::new())).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.observatory(), "parkes");
        assert_eq!(resolver.parse_count(), 0);
    }

    #[test]
    fn test_shared_table_parsed_once() {
        let resolver = ChainResolver::new(source());
        let a = parkes(vec![tempo2("pks2gps.clk"), tempo2("gps2utc.clk")]);
        let b = ObservatoryRecord::new("other", [1.0, 0.0, 0.0])
            .unwrap()
            .with_clock_chain(vec![tempo2("gps2utc.clk")]);

        let first = resolver.resolve(&a).unwrap();
        let second = resolver.resolve(&a).unwrap();
        let shared = resolver.resolve(&b).unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.parse_count(), 2);
        assert_eq!(resolver.cached_tables(), 2);
        assert!(Arc::ptr_eq(first.links()[1].table(), shared.links()[0].table()));
    }

    #[test]
    fn test_format_is_part_of_key() {
        let texts = InMemoryClockSource::new()
            .with_text("both.dat", " 50000.00       0.000       1.000 x\n");
        let resolver = ChainResolver::new(texts);
        let rec = parkes(vec![ClockLinkSpec::new("both.dat", ClockFormat::Tempo)]);
        resolver.resolve(&rec).unwrap();
        let err = resolver.resolve(&parkes(vec![tempo2("both.dat")])).unwrap_err();
        assert!(matches!(err, ClockError::MalformedEntry { .. }));
        assert_eq!(resolver.parse_count(), 2);
    }

    #[test]
    fn test_missing_source() {
        let resolver = ChainResolver::new(source());
        let err = resolver
            .resolve(&parkes(vec![tempo2("pks2gps.clk"), tempo2("nowhere.clk")]))
            .unwrap_err();
        assert_eq!(
            err,
            ClockError::missing_clock_source("parkes", "nowhere.clk")
        );
        assert_eq!(resolver.cached_tables(), 1);
    }

    #[test]
    fn test_failed_parse_not_cached() {
        let texts = InMemoryClockSource::new().with_text("bad.clk", "# A B\n50000 oops\n");
        let resolver = ChainResolver::new(texts);
        let rec = parkes(vec![tempo2("bad.clk")]);
        assert!(resolver.resolve(&rec).is_err());
        assert!(resolver.resolve(&rec).is_err());
        assert_eq!(resolver.parse_count(), 2);
        assert_eq!(resolver.cached_tables(), 0);
    }

    #[test]
    fn test_noop_links_skip_source() {
        let resolver = ChainResolver::new(InMemoryClockSource::new());
        let chain = resolver
            .resolve(&parkes(vec![ClockLinkSpec::noop(), tempo2("   ")]))
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.links().iter().all(ResolvedLink::is_noop));
        assert_eq!(resolver.parse_count(), 0);
    }

    #[test]
    fn test_bogus_last_keeps_raw_table() {
        let resolver = ChainResolver::new(source());
        let chain = resolver
            .resolve(&parkes(vec![
                tempo2("pks2gps.clk").with_bogus_last_correction(true)
            ]))
            .unwrap();
        let link = &chain.links()[0];
        assert_eq!(link.table().len(), 2);
        assert_eq!(link.effective_samples().len(), 1);
        assert_eq!(link.effective_bounds(), Some((50000.0, 50000.0)));
        assert_eq!(link.policy(), ExtrapolationPolicy::Reject);
    }

    #[test]
    fn test_bogus_last_on_single_sample() {
        let texts = InMemoryClockSource::new().with_text("one.clk", "# A B\n50000 1e-6\n");
        let resolver = ChainResolver::new(texts);
        let err = resolver
            .resolve(&parkes(vec![
                tempo2("one.clk").with_bogus_last_correction(true)
            ]))
            .unwrap_err();
        assert!(matches!(err, ClockError::UnusableClockTable { .. }));
    }

    #[test]
    fn test_reference_links_follow_flags() {
        let resolver = ChainResolver::new(source()).with_gps_link(tempo2("gps2utc.clk"));
        let without = parkes(vec![tempo2("pks2gps.clk")]);
        let with = without.clone().with_include_gps(true).with_include_bipm(true);

        assert_eq!(resolver.resolve(&without).unwrap().len(), 1);
        let chain = resolver.resolve(&with).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.links()[1].table().name(), "gps2utc.clk");
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pks2gps.clk"), PKS).unwrap();
        std::fs::create_dir(dir.path().join("nested.clk")).unwrap();

        let resolver = ChainResolver::new(DirectoryClockSource::new(dir.path()));
        let chain = resolver.resolve(&parkes(vec![tempo2("pks2gps.clk")])).unwrap();
        assert_eq!(chain.links()[0].table().len(), 2);

        let missing = resolver.resolve(&parkes(vec![tempo2("gps2utc.clk")]));
        assert!(matches!(missing, Err(ClockError::MissingClockSource { .. })));

        let unreadable = resolver.resolve(&parkes(vec![tempo2("nested.clk")]));
        assert!(matches!(unreadable, Err(ClockError::Source { .. })));
    }

    #[test]
    fn test_directory_source_stays_under_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("clock");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.clk"), PKS).unwrap();
        std::fs::write(root.join("pks2gps.clk"), PKS).unwrap();

        let source = DirectoryClockSource::new(&root);
        assert!(source.read("./pks2gps.clk").unwrap().is_some());

        let absolute = outer.path().join("secret.clk");
        for name in ["../secret.clk", "sub/../../secret.clk", absolute.to_str().unwrap()] {
            assert!(
                matches!(source.read(name), Err(ClockError::Source { .. })),
                "read outside root: {}",
                name
            );
        }
    }

    #[test]
    fn test_invalidate_forces_reparse() {
        let resolver = ChainResolver::new(source());
        let rec = parkes(vec![tempo2("pks2gps.clk")]);
        let before = resolver.resolve(&rec).unwrap();
        resolver.invalidate();
        assert_eq!(resolver.cached_tables(), 0);
        let after = resolver.resolve(&rec).unwrap();
        assert_eq!(before, after);
        assert_eq!(resolver.parse_count(), 2);
    }
}
