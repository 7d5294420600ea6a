use super::*;
use crate::config::RankingConfig;

/// Orders the available snapshots into the sequence they should be tried in.
///
/// 1. The newest supported stable release.
/// 1. The nightly snapshot.
/// 1. The remaining supported stable releases, newest first.
///
/// Stable releases with a major version below [`RankingConfig::min_supported_major`] are left out.
/// The result is never empty as the nightly is always included.
pub fn rank_snapshots(available: &AvailableSnapshots, config: &RankingConfig) -> Vec<Snapshot> {
	let mut stable = available.stable_snapshots()
		.rev()
		.filter(|s| matches!(s, Snapshot::Lts { major, .. } if *major >= config.min_supported_major));

	let mut ranked = Vec::with_capacity(available.stable.len() + 1);
	ranked.extend(stable.next());
	ranked.push(available.nightly.clone());
	ranked.extend(stable);

	log::debug!("Ranked snapshots: {}", ranked.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "));
	ranked
}

#[cfg(test)]
mod test {
	use super::*;

	fn available(stable: &[(u32, u32)]) -> AvailableSnapshots {
		AvailableSnapshots {
			stable: stable.iter().copied().collect(),
			nightly: Snapshot::Nightly { date: "2024-05-01".into() },
		}
	}

	fn lts(major: u32, minor: u32) -> Snapshot {
		Snapshot::Lts { major, minor }
	}

	#[test]
	fn newest_stable_then_nightly_then_older() {
		let ranked = rank_snapshots(&available(&[(20, 26), (22, 43), (21, 25)]), &RankingConfig::default());
		assert_eq!(ranked, vec![
			lts(22, 43),
			Snapshot::Nightly { date: "2024-05-01".into() },
			lts(21, 25),
			lts(20, 26),
		]);
	}

	#[test]
	fn releases_below_baseline_are_dropped() {
		let ranked = rank_snapshots(&available(&[(2, 22), (3, 22), (4, 2)]), &RankingConfig { min_supported_major: 3 });
		assert_eq!(ranked, vec![lts(4, 2), Snapshot::Nightly { date: "2024-05-01".into() }, lts(3, 22)]);
	}

	#[test]
	fn only_nightly_when_nothing_is_supported() {
		let ranked = rank_snapshots(&available(&[(1, 0), (2, 22)]), &RankingConfig { min_supported_major: 3 });
		assert_eq!(ranked, vec![Snapshot::Nightly { date: "2024-05-01".into() }]);
	}
}
