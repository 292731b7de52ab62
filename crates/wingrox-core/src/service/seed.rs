//! Default community segments created at startup.

use chrono::Utc;
use wingrox_types::Segment;

use super::{ResourceOps, SegmentService, ServiceError};

/// `(slug, name, description)` of every default segment.
pub const DEFAULT_SEGMENTS: &[(&str, &str, &str)] = &[
    ("career-plateau", "Career Plateau", "Feeling stuck at the same level for too long"),
    ("burnout-recovery", "Burnout Recovery", "Rebuilding energy and motivation after burnout"),
    ("career-change", "Career Change", "Moving into a new field or role"),
    ("leadership-growth", "Leadership Growth", "Stepping up into leading people and teams"),
];

/// Insert any default segment that is missing. Existing segments, including
/// soft-deleted ones, are left alone. Returns how many were created.
pub async fn ensure_default_segments(segments: &SegmentService) -> Result<usize, ServiceError> {
    let repo = segments.records().repository();
    let mut created = 0;
    for (id, name, description) in DEFAULT_SEGMENTS {
        if repo.get(id).await?.is_some() {
            continue;
        }
        let segment =
            Segment::new(id.to_string(), name.to_string(), Some(description.to_string()), Utc::now());
        repo.insert(&segment).await?;
        created += 1;
    }
    if created > 0 {
        tracing::info!("Seeded {} default segments", created);
    }
    Ok(created)
}
