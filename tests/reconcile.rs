//! Chapter overrun reconciliation tests.

use discsplit::{
    DiscSplitError, EndpointContext, EndpointPolicy, FrameSequence, LegacyEndpoint,
    PackedEndpoint, SourceFrames, is_overrun, join, reconcile, reconcile_chapters, split,
};

fn assert_strictly_increasing(chapters: &[Vec<u64>]) {
    for offsets in chapters {
        assert!(
            offsets.windows(2).all(|pair| pair[0] < pair[1]),
            "offsets not strictly increasing: {offsets:?}"
        );
    }
}

#[test]
fn single_title_overrun_is_trimmed_to_stream() {
    let stream = SourceFrames::new(300);
    let state = split(&[vec![0, 100, 500]], 0, &stream).expect("split");
    let reconciled = reconcile(&state, &stream, &PackedEndpoint).expect("reconcile");

    assert_eq!(reconciled.chapters, vec![vec![0, 100, 300]]);
    assert_strictly_increasing(&reconciled.chapters);

    let joined = join(&reconciled).expect("join");
    assert!(joined.chapter_end() <= stream.frame_count());
    assert_eq!(joined.clip.frame_count(), 300);
}

#[test]
fn no_overrun_leaves_state_unchanged() {
    let stream = SourceFrames::new(200);
    let state = split(&[vec![0, 50, 120], vec![0, 80]], 0, &stream).expect("split");
    let reconciled = reconcile(&state, &stream, &PackedEndpoint).expect("reconcile");

    assert_eq!(reconciled, state);
    assert_eq!(
        reconcile(&reconciled, &stream, &PackedEndpoint).expect("reconcile"),
        reconciled
    );
}

#[test]
fn later_titles_collapse_to_one_frame() {
    let content = vec![vec![0, 100, 200], vec![0, 300, 600], vec![0, 50], vec![0, 70]];
    let chapters = reconcile_chapters(&content, 500, 0, &PackedEndpoint).expect("reconcile");

    // Title 1 may end at 500 - 2 (two titles follow) = 498, i.e. 298 locally.
    assert_eq!(
        chapters,
        vec![vec![0, 100, 200], vec![0, 298], vec![0, 1], vec![0, 1]]
    );
    assert!(!is_overrun(&chapters, 0, 500));
    assert_strictly_increasing(&chapters);
}

#[test]
fn menu_title_is_restored_after_trimming() {
    let stream = SourceFrames::new(300);
    let state = split(&[vec![0, 100, 300], vec![0, 40]], 20, &stream).expect("split");
    assert!(is_overrun(state.content_chapters(), 20, 300));

    let reconciled = reconcile(&state, &stream, &PackedEndpoint).expect("reconcile");
    assert_eq!(
        reconciled.chapters,
        vec![vec![0, 100, 279], vec![0, 1], vec![0, 20]]
    );
    assert_eq!(reconciled.clips[2].ranges(), &[0..20]);

    let joined = join(&reconciled).expect("join");
    assert_eq!(joined.chapter_end(), 300);
    assert_eq!(joined.clip.frame_count(), 300);
}

#[test]
fn legacy_endpoint_matches_packed_with_menu() {
    let content = vec![vec![0, 100, 300], vec![0, 40]];
    let packed = reconcile_chapters(&content, 300, 20, &PackedEndpoint).expect("packed");
    let legacy = reconcile_chapters(&content, 300, 20, &LegacyEndpoint).expect("legacy");
    assert_eq!(packed, legacy);
}

#[test]
fn legacy_endpoint_without_menu_is_fatal() {
    let result = reconcile_chapters(&[vec![0, 100, 500]], 300, 0, &LegacyEndpoint);
    assert!(matches!(
        result,
        Err(DiscSplitError::ChapterOverrun {
            total_frames: 300,
            ..
        })
    ));
}

#[test]
fn endpoint_on_previous_boundary_is_fatal() {
    struct Early;

    impl EndpointPolicy for Early {
        fn safe_endpoint(&self, _context: &EndpointContext) -> i64 {
            100
        }

        fn name(&self) -> &'static str {
            "early"
        }
    }

    let result = reconcile_chapters(&[vec![0, 100, 500]], 300, 0, &Early);
    assert!(matches!(
        result,
        Err(DiscSplitError::ChapterOverrun { title: 0, .. })
    ));
}

#[test]
fn negative_endpoint_is_fatal() {
    let content = vec![vec![0, 10]; 5];
    let result = reconcile_chapters(&content, 3, 0, &PackedEndpoint);
    assert!(matches!(result, Err(DiscSplitError::ChapterOverrun { .. })));
}

#[test]
fn endpoint_context_counts_following_titles() {
    let context = EndpointContext {
        total_frames: 1000,
        menu_length: 10,
        title_count: 4,
        content_titles: 3,
        title_index: 0,
    };
    assert_eq!(context.titles_after(), 2);
    assert_eq!(PackedEndpoint.safe_endpoint(&context), 988);
    assert_eq!(LegacyEndpoint.safe_endpoint(&context), 988);
}

#[test]
fn huge_totals_do_not_wrap_negative() {
    let context = EndpointContext {
        total_frames: u64::MAX,
        menu_length: 0,
        title_count: 2,
        content_titles: 2,
        title_index: 0,
    };
    assert_eq!(PackedEndpoint.safe_endpoint(&context), i64::MAX - 1);
    assert!(LegacyEndpoint.safe_endpoint(&context) > 0);
}

#[test]
fn boundary_beyond_i64_is_fatal() {
    let content = vec![vec![0, 50], vec![0, u64::MAX - 10]];
    let result = reconcile_chapters(&content, 100, 0, &PackedEndpoint);
    assert!(matches!(
        result,
        Err(DiscSplitError::ChapterOverrun {
            title: 1,
            boundary: i64::MAX,
            total_frames: 100,
        })
    ));
}
