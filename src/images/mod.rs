//! Image resolution: canonical dedup followed by concurrent validation.

mod pool;
mod probe;
mod resolver;

pub use pool::ValidationPool;
pub use probe::{
    validate_candidate, HttpImageProbe, ImageProbe, ProbeError, ProbeResponse,
    DEFAULT_MIN_IMAGE_BYTES,
};
pub use resolver::{ImageResolver, DEFAULT_CONCURRENCY};

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    /// Scripted probe that records calls and the peak number in flight.
    #[derive(Default)]
    struct FakeProbe {
        head: HashMap<String, Result<ProbeResponse, ()>>,
        get: HashMap<String, Result<ProbeResponse, ()>>,
        calls: Mutex<Vec<(&'static str, String)>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
    }

    impl FakeProbe {
        fn respond(
            &self,
            method: &'static str,
            url: &str,
            table: &HashMap<String, Result<ProbeResponse, ()>>,
        ) -> Result<ProbeResponse, ProbeError> {
            self.calls.lock().unwrap().push((method, url.to_string()));
            match table.get(url) {
                Some(Ok(resp)) => Ok(resp.clone()),
                Some(Err(())) => Err(ProbeError::Transport("connection reset".into())),
                None => Ok(ok(404, None, None)),
            }
        }

        async fn track<T>(&self, result: T) -> T {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn calls_for(&self, method: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, _)| *m == method)
                .map(|(_, u)| u.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ImageProbe for FakeProbe {
        async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
            let result = self.respond("HEAD", url, &self.head);
            self.track(result).await
        }

        async fn get(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
            let result = self.respond("GET", url, &self.get);
            self.track(result).await
        }
    }

    fn ok(status: u16, content_type: Option<&str>, len: Option<u64>) -> ProbeResponse {
        ProbeResponse {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: content_type.map(String::from),
            content_length: len,
        }
    }

    fn image(len: u64) -> Result<ProbeResponse, ()> {
        Ok(ok(200, Some("image/jpeg"), Some(len)))
    }

    #[tokio::test]
    async fn test_head_accept_skips_get() {
        let mut probe = FakeProbe::default();
        probe.head.insert("a".into(), image(4096));

        assert!(validate_candidate(&probe, "a", 128).await);
        assert!(probe.calls_for("GET").is_empty());
    }

    #[tokio::test]
    async fn test_non_image_head_falls_back_to_get() {
        let mut probe = FakeProbe::default();
        probe.head.insert("a".into(), Ok(ok(200, Some("text/html"), Some(4096))));
        probe.get.insert("a".into(), Ok(ok(200, Some("image/png"), None)));

        assert!(validate_candidate(&probe, "a", 128).await);
        assert_eq!(probe.calls_for("GET"), vec!["a"]);
    }

    #[tokio::test]
    async fn test_small_head_and_head_error_fall_back() {
        let mut probe = FakeProbe::default();
        probe.head.insert("small".into(), image(64));
        probe.get.insert("small".into(), image(64));
        probe.head.insert("broken".into(), Err(()));
        probe.get.insert("broken".into(), image(9000));
        probe.head.insert("dead".into(), Err(()));
        probe.get.insert("dead".into(), Err(()));

        assert!(validate_candidate(&probe, "small", 128).await);
        assert!(validate_candidate(&probe, "broken", 128).await);
        assert!(!validate_candidate(&probe, "dead", 128).await);
    }

    #[tokio::test]
    async fn test_pool_bounds_concurrency_and_probes_each_once() {
        let mut probe = FakeProbe {
            delay: Duration::from_millis(20),
            ..Default::default()
        };
        let urls: Vec<String> = (0..20).map(|i| format!("img-{i}")).collect();
        for (i, url) in urls.iter().enumerate() {
            if i % 2 == 0 {
                probe.head.insert(url.clone(), image(1024));
            }
        }

        let pool = ValidationPool::new(&probe, 4, 128);
        let mut accepted = pool.run(&urls).await;
        accepted.sort();

        let mut heads = probe.calls_for("HEAD");
        heads.sort();
        let mut expected_all = urls.clone();
        expected_all.sort();
        assert_eq!(heads, expected_all);
        assert_eq!(probe.calls_for("GET").len(), 10);
        assert_eq!(probe.peak.load(Ordering::SeqCst), 4);

        let mut expected: Vec<String> = urls.iter().step_by(2).cloned().collect();
        expected.sort();
        assert_eq!(accepted, expected);
    }

    #[tokio::test]
    async fn test_pool_never_spawns_more_workers_than_work() {
        let probe = FakeProbe {
            delay: Duration::from_millis(10),
            ..Default::default()
        };
        let pool = ValidationPool::new(&probe, 16, 128);
        assert_eq!(pool.worker_count(3), 3);
        assert_eq!(pool.worker_count(0), 0);
        assert_eq!(ValidationPool::new(&probe, 0, 128).worker_count(5), 1);

        let urls = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(pool.run(&urls).await.is_empty());
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
        assert!(pool.run(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_dedups_before_probing() {
        let mut probe = FakeProbe::default();
        let kept = "https://file4.batdongsan.com.vn/resize/1200x900/2024/a.jpg";
        probe.head.insert(kept.into(), image(2048));
        let probe = Arc::new(probe);

        let resolver = ImageResolver::new(probe.clone(), 6);
        let images = resolver
            .resolve([
                "https://file4.batdongsan.com.vn/crop/200x150/2024/a.jpg?x=1",
                "https://file4.batdongsan.com.vn/resize/745x510/2024/a.jpg",
                "https://file4.batdongsan.com.vn/2024/b.jpg",
            ])
            .await;

        assert_eq!(images, vec![kept]);
        assert_eq!(probe.calls_for("HEAD").len(), 2);
    }
}
