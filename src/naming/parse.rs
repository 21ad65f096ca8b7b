//! Inverse of the formatting in [`crate::naming`].
//!
//! Names that match no known plane tag are not errors: classification returns
//! `None` and callers treat the directory as "not a plot directory".

use std::ops::Range;

use super::{PathSegment, PlaneKind, Placement};

/// Classify a directory name by plane tag.  Tags are tested by containment in
/// [`PlaneKind::CLASSIFY_ORDER`]; the first hit wins.
pub fn classify(name: &str) -> Option<PlaneKind> {
    PlaneKind::CLASSIFY_ORDER.into_iter().find(|k| name.contains(k.tag()))
}

/// Byte offset of the `V<version>` field.  For a classified name this is just
/// past `.<tag>.`, so markers inside the prefix are never seen; for anything
/// else the whole name is scanned.
fn fields_start(name: &str) -> usize {
    classify(name)
        .and_then(|k| {
            let marker = format!(".{}.", k.tag());
            name.find(&marker).map(|at| at + marker.len())
        })
        .unwrap_or(0)
}

/// The part of `name` after the prefix and plane tag, starting at `V<version>`.
pub(crate) fn segment_fields(name: &str) -> &str {
    &name[fields_start(name)..]
}

/// Byte range of the optionally signed integer immediately after `marker`,
/// searched for after the prefix.
fn number_span(name: &str, marker: &str) -> Option<Range<usize>> {
    let from = fields_start(name);
    let start = from + name[from..].find(marker)? + marker.len();
    let bytes = name.as_bytes();
    let mut end = start;
    if bytes.get(end) == Some(&b'-') {
        end += 1;
    }
    let digits_from = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    (end > digits_from).then_some(start..end)
}

/// Step number following `step_`.
pub fn step_of(name: &str) -> Option<u64> {
    let span = number_span(name, "step_")?;
    name[span].parse().ok()
}

/// Cut coordinate following `cut_`.
pub fn cut_of(name: &str) -> Option<i64> {
    let span = number_span(name, "cut_")?;
    name[span].parse().ok()
}

fn replace_cut(name: &str, value: i64) -> String {
    match number_span(name, "cut_") {
        Some(span) => format!("{}{value}{}", &name[..span.start], &name[span.end..]),
        None       => name.to_owned(),
    }
}

/// Move the cut by `delta`.  `None` if `name` has no cut.
pub fn shift_cut(name: &str, delta: i64) -> Option<String> {
    let cut = cut_of(name)?;
    Some(replace_cut(name, cut.checked_add(delta)?))
}

/// Replace the cut with `value`.  `None` if `name` has no cut.
pub fn set_cut(name: &str, value: i64) -> Option<String> {
    cut_of(name)?;
    Some(replace_cut(name, value))
}

fn field<T: std::str::FromStr>(component: &str, key: &str) -> Option<T> {
    component.strip_prefix(key)?.strip_prefix('_')?.parse().ok()
}

impl PathSegment {
    /// Recover every part of a directory name produced by `Display`.
    pub fn parse(name: &str) -> Option<Self> {
        let kind = classify(name)?;
        let marker = format!(".{}.V", kind.tag());
        let at = name.find(&marker)?;
        let prefix = &name[..at];

        let mut parts = name[at + marker.len()..].split('.');
        let version: u32 = parts.next()?.parse().ok()?;
        let step: u64 = field(parts.next()?, "step")?;
        let rest: Vec<&str> = parts.collect();

        let placement = match (kind, rest.as_slice()) {
            (PlaneKind::XyPlane | PlaneKind::XzPlane | PlaneKind::YzPlane, [cut]) => {
                Placement::Cut(field(cut, "cut")?)
            }
            (PlaneKind::Volume, []) => Placement::Whole,
            (PlaneKind::RotationalCapture, [angle, blade]) => Placement::Capture {
                angle:    field(angle, "angle")?,
                blade_id: field(blade, "bladeId")?,
            },
            (PlaneKind::YzAnglePlane, [angle]) => Placement::Angle(field(angle, "angle")?),
            (PlaneKind::Sector, [a1, a2]) => Placement::Sector {
                angle1: field(a1, "angle1")?,
                angle2: field(a2, "angle2")?,
            },
            _ => return None,
        };

        Some(Self { prefix: prefix.to_owned(), kind, version, step, placement })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const XZ: &str = "plot.xzPlane.V5.step_00000020.cut_14";

    #[test]
    fn query_parts() {
        assert_eq!(classify(XZ), Some(PlaneKind::XzPlane));
        assert_eq!(step_of(XZ), Some(20));
        assert_eq!(cut_of(XZ), Some(14));
        assert_eq!(cut_of("plot.volume.V5.step_00000050"), None);
        assert_eq!(classify("plot_output_np1_gridx44"), None);
        assert_eq!(step_of("step_"), None);
    }

    #[test]
    fn prefix_markers_are_ignored() {
        let name = PathSegment::xz_plane(20, 14).with_prefix("shortcut_2").to_string();
        assert_eq!(cut_of(&name), Some(14));
        assert_eq!(step_of(&name), Some(20));
        assert_eq!(shift_cut(&name, 3).as_deref(), Some("shortcut_2.xzPlane.V5.step_00000020.cut_17"));
        assert_eq!(set_cut(&name, -1).as_deref(), Some("shortcut_2.xzPlane.V5.step_00000020.cut_-1"));
        assert_eq!(step_of("timestep_7.volume.V5.step_00000050"), Some(50));
        assert_eq!(cut_of("a.cut_9.volume.V5.step_00000050"), None);
        assert_eq!(segment_fields("timestep_7.volume.V5.step_00000050"), "V5.step_00000050");
    }

    #[test]
    fn classification_order_is_fixed() {
        assert_eq!(classify("xyPlane.volume"), Some(PlaneKind::XyPlane));
        assert_eq!(classify("volume.yzPlane"), Some(PlaneKind::YzPlane));
    }

    #[test]
    fn shift_and_set_cut() {
        assert_eq!(shift_cut(XZ, 3).as_deref(), Some("plot.xzPlane.V5.step_00000020.cut_17"));
        assert_eq!(shift_cut(XZ, -20).as_deref(), Some("plot.xzPlane.V5.step_00000020.cut_-6"));
        assert_eq!(set_cut(XZ, 0).as_deref(), Some("plot.xzPlane.V5.step_00000020.cut_0"));
        assert_eq!(shift_cut("plot.volume.V5.step_00000050", 1), None);
        assert_eq!(set_cut("plot.volume.V5.step_00000050", 1), None);
    }

    #[test]
    fn parse_full_segment() {
        let seg = PathSegment::parse(XZ).unwrap();
        assert_eq!(seg, PathSegment::xz_plane(20, 14));
        assert_eq!(seg.cut(), Some(14));

        let cap = PathSegment::parse("run.rotational_capture.V5.step_00000007.angle_90.bladeId_2").unwrap();
        assert_eq!(cap, PathSegment::rotational_capture(7, 90, 2).with_prefix("run"));
        assert_eq!(cap.blade_id(), Some(2));
    }

    #[test]
    fn parse_rejects_wrong_trailer() {
        assert!(PathSegment::parse("plot.volume.V5.step_00000050.cut_3").is_none());
        assert!(PathSegment::parse("plot.xzPlane.V5.step_00000020").is_none());
        assert!(PathSegment::parse("plot.xzPlane.V5.cut_14").is_none());
        assert!(PathSegment::parse("CUid.0.0.0.V5.QVec.bin").is_none());
    }

    fn any_segment() -> impl Strategy<Value = PathSegment> {
        let prefix = prop::sample::select(vec![
            "plot", "run", "out.a", "p_1", "shortcut_2", "timestep_7", "a.step_1.cut_3",
        ]);
        let step = 0u64..=99_999_999;
        (prefix, step, 0..7usize, any::<i32>(), any::<i32>()).prop_map(|(p, step, k, a, b)| {
            let (a, b) = (a as i64, b as i64);
            let seg = match PlaneKind::CLASSIFY_ORDER[k] {
                PlaneKind::XyPlane           => PathSegment::xy_plane(step, a),
                PlaneKind::XzPlane           => PathSegment::xz_plane(step, a),
                PlaneKind::YzPlane           => PathSegment::yz_plane(step, a),
                PlaneKind::Volume            => PathSegment::volume(step),
                PlaneKind::RotationalCapture => PathSegment::rotational_capture(step, a, b),
                PlaneKind::YzAnglePlane      => PathSegment::yz_angle_plane(step, a),
                PlaneKind::Sector            => PathSegment::sector(step, a, b),
            };
            seg.with_prefix(p)
        })
    }

    proptest! {
        #[test]
        fn format_then_parse_recovers_segment(seg in any_segment()) {
            let name = seg.to_string();
            prop_assert_eq!(PathSegment::parse(&name), Some(seg.clone()));
            prop_assert_eq!(classify(&name), Some(seg.kind));
            prop_assert_eq!(step_of(&name), Some(seg.step));
            prop_assert_eq!(cut_of(&name), seg.cut());
        }

        #[test]
        fn shift_cut_moves_by_delta(step in 0u64..=99_999_999, cut in -10_000i64..10_000, d in -500i64..500) {
            let name = PathSegment::xy_plane(step, cut).to_string();
            let shifted = shift_cut(&name, d).unwrap();
            prop_assert_eq!(PathSegment::parse(&shifted), Some(PathSegment::xy_plane(step, cut + d)));
        }
    }
}
