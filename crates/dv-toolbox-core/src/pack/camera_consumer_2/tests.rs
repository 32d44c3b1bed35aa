use arbitrary_int::u5;
use rstest::rstest;
use rust_decimal_macros::dec;
use stdext::function_name;

use super::super::*;
use crate::{pack::testutil::PackBinaryTestCase, testutil::*};

test_all_test_cases_ran!(("test_camera_consumer_2_binary", &CAMERA_CONSUMER_2_BINARY_TEST_CASES));

static CAMERA_CONSUMER_2_BINARY_TEST_CASES: LazyTestCases<PackBinaryTestCase> = test_case_map!(
    "all_no_info",
    PackBinaryTestCase {
        input: "71 FF 3F FF 7F",
        parsed: Some(Pack::CameraConsumer2(validated(
            CameraConsumer2 {
                vertical_panning_direction: PanningDirection::OppositeDirectionOfScanning,
                vertical_panning_speed: None,
                horizontal_panning_direction: PanningDirection::SameDirectionAsScanning,
                horizontal_panning_speed: None,
                image_stabilizer_on: true,
                focal_length: None,
                electric_zoom_on: true,
                electric_zoom_magnification: None,
                reserved: arbitrary_int::u2::new(3),
            },
            *NTSC
        ))),
        ..Default::default()
    },
    "with_values",
    PackBinaryTestCase {
        input: "71 CF 11 00 35",
        parsed: Some(Pack::CameraConsumer2(validated(
            CameraConsumer2 {
                vertical_panning_direction: PanningDirection::SameDirectionAsScanning,
                vertical_panning_speed: Some(u5::new(0xF)),
                horizontal_panning_direction: PanningDirection::SameDirectionAsScanning,
                horizontal_panning_speed: Some(0x11 * 2),
                image_stabilizer_on: true,
                focal_length: Some(0),
                electric_zoom_on: true,
                electric_zoom_magnification: Some(dec!(3.5)),
                reserved: arbitrary_int::u2::new(3),
            },
            *NTSC
        ))),
        ..Default::default()
    }
);

#[googletest::test]
#[rstest]
#[case::all_no_info(function_name!())]
#[case::with_values(function_name!())]
fn test_camera_consumer_2_binary(#[case] test_function_name: &str) {
    let tc = CAMERA_CONSUMER_2_BINARY_TEST_CASES.get_test_case(test_function_name);
    run_pack_binary_test_case(tc);
}
