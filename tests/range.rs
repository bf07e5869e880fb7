//! Chapter selection integration tests.

use discsplit::{
    ChapterSelector, DiscSplitError, FrameSequence, ResolvedFrames, SourceFrames, TitleSlice,
    resolve_frames, resolve_range,
};

const OFFSETS: [u64; 4] = [0, 100, 250, 400];

fn frames(selector: ChapterSelector) -> ResolvedFrames {
    resolve_frames(&OFFSETS, &selector).expect("resolve")
}

#[test]
fn first_and_last_chapter() {
    assert_eq!(frames(ChapterSelector::Index(0)), ResolvedFrames::Range(0..100));
    assert_eq!(frames(ChapterSelector::Index(-1)), ResolvedFrames::Range(250..400));
}

#[test]
fn middle_chapter() {
    assert_eq!(frames(ChapterSelector::Index(1)), ResolvedFrames::Range(100..250));
}

#[test]
fn last_offset_index_aliases_last_chapter() {
    let n = OFFSETS.len() as i64;
    assert_eq!(
        frames(ChapterSelector::Index(n - 1)),
        frames(ChapterSelector::Index(-1))
    );
}

#[test]
fn index_zero_matches_open_span_to_zero() {
    assert_eq!(
        frames(ChapterSelector::Index(0)),
        frames(ChapterSelector::Span(None, Some(0)))
    );
}

#[test]
fn span_end_is_inclusive() {
    assert_eq!(
        frames(ChapterSelector::Span(Some(0), Some(1))),
        ResolvedFrames::Range(0..250)
    );
    assert_eq!(
        frames(ChapterSelector::Span(Some(1), None)),
        ResolvedFrames::Range(100..400)
    );
    assert_eq!(
        frames(ChapterSelector::Span(None, None)),
        ResolvedFrames::Range(0..400)
    );
}

#[test]
fn span_never_reaches_two_past_end() {
    for end in 0..2 {
        let ResolvedFrames::Range(range) = frames(ChapterSelector::Span(Some(0), Some(end))) else {
            panic!("expected a single range");
        };
        assert_eq!(range.end, OFFSETS[end as usize + 1]);
    }
}

#[test]
fn negative_span_bounds_count_from_last_offset() {
    let offsets: Vec<u64> = vec![0, 10, 20, 30, 40];
    let negative = resolve_frames(&offsets, &ChapterSelector::Span(Some(-2), Some(-1)))
        .expect("resolve");
    let positive =
        resolve_frames(&offsets, &ChapterSelector::Span(Some(2), Some(2))).expect("resolve");

    assert_eq!(negative, ResolvedFrames::Range(20..30));
    assert_eq!(negative, positive);
}

#[test]
fn span_past_last_chapter_is_out_of_range() {
    let offsets: Vec<u64> = vec![0, 10, 20, 30, 40];
    let result = resolve_frames(&offsets, &ChapterSelector::Span(Some(3), Some(4)));
    assert!(matches!(
        result,
        Err(DiscSplitError::IndexOutOfRange { index: 5, len: 5 })
    ));
}

#[test]
fn indices_are_never_clamped() {
    assert!(matches!(
        resolve_frames(&OFFSETS, &ChapterSelector::Index(4)),
        Err(DiscSplitError::IndexOutOfRange { index: 4, len: 4 })
    ));
    assert!(matches!(
        resolve_frames(&OFFSETS, &ChapterSelector::Index(-5)),
        Err(DiscSplitError::IndexOutOfRange { index: -2, len: 4 })
    ));
}

#[test]
fn extreme_indices_are_out_of_range() {
    let cases = [
        (ChapterSelector::Index(i64::MAX), i64::MAX),
        (ChapterSelector::Index(i64::MIN), i64::MIN + 3),
        (ChapterSelector::Span(Some(0), Some(i64::MAX)), i64::MAX),
        (ChapterSelector::Span(Some(i64::MAX), None), i64::MAX),
        (ChapterSelector::Span(Some(i64::MIN), None), i64::MIN + 3),
        (ChapterSelector::Span(None, Some(i64::MIN)), i64::MIN + 3),
    ];

    for (selector, expected) in cases {
        match resolve_frames(&OFFSETS, &selector) {
            Err(DiscSplitError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, expected, "{selector}");
                assert_eq!(len, OFFSETS.len());
            }
            other => panic!("{selector}: expected IndexOutOfRange, got {other:?}"),
        }
    }
}

#[test]
fn parsed_max_index_is_out_of_range() {
    let selector: ChapterSelector = "9223372036854775807".parse().expect("parse");
    let clip = SourceFrames::new(400);

    assert!(matches!(
        resolve_range(&OFFSETS, &clip, &selector),
        Err(DiscSplitError::IndexOutOfRange {
            index: i64::MAX,
            len: 4
        })
    ));
}

#[test]
fn reversed_span_is_invalid() {
    let result = resolve_frames(&OFFSETS, &ChapterSelector::Span(Some(2), Some(0)));
    assert!(matches!(
        result,
        Err(DiscSplitError::InvalidRange {
            start: 250,
            end: 100
        })
    ));
}

#[test]
fn single_offset_has_no_chapters() {
    let result = resolve_frames(&[0], &ChapterSelector::Index(0));
    assert!(matches!(result, Err(DiscSplitError::EmptyMetadata(_))));
}

#[test]
fn list_keeps_order() {
    let selector: ChapterSelector = "-1,0,1:2".parse().expect("parse");
    assert_eq!(
        frames(selector),
        ResolvedFrames::List(vec![
            ResolvedFrames::Range(250..400),
            ResolvedFrames::Range(0..100),
            ResolvedFrames::Range(100..400),
        ])
    );
}

#[test]
fn resolve_range_slices_the_clip() {
    let clip = SourceFrames::from_ranges([20..300, 0..20]);
    let offsets: Vec<u64> = vec![0, 100, 280, 300];

    let last = resolve_range(&offsets, &clip, &ChapterSelector::Index(-1))
        .expect("resolve")
        .into_clip()
        .expect("single clip");
    assert_eq!(last.ranges(), &[0..20]);

    let middle = resolve_range(&offsets, &clip, &ChapterSelector::Index(1))
        .expect("resolve")
        .into_clip()
        .expect("single clip");
    assert_eq!(middle.ranges(), &[120..300]);
    assert_eq!(middle.frame_count(), 180);
}

#[test]
fn resolve_range_list_returns_one_clip_per_selector() {
    let clip: Vec<u32> = (0..400).collect();
    let selector = ChapterSelector::List(vec![ChapterSelector::Index(0), ChapterSelector::Index(2)]);
    let slices = resolve_range(&OFFSETS, &clip, &selector)
        .expect("resolve")
        .into_list()
        .expect("list");

    assert_eq!(slices.len(), 2);
    let lengths: Vec<u64> = slices
        .into_iter()
        .filter_map(TitleSlice::into_clip)
        .map(|clip| clip.frame_count())
        .collect();
    assert_eq!(lengths, vec![100, 150]);
}

#[test]
fn range_past_clip_end_is_an_error() {
    let clip = SourceFrames::new(300);
    let result = resolve_range(&[0, 100, 500], &clip, &ChapterSelector::Index(-1));
    assert!(matches!(
        result,
        Err(DiscSplitError::FrameOutOfRange {
            frame_number: 500,
            total_frames: 300
        })
    ));
}
