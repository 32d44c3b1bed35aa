use rstest::rstest;
use stdext::function_name;

use super::super::*;
use crate::{pack::testutil::PackBinaryTestCase, testutil::*};

test_all_test_cases_ran!(("test_camera_shutter_binary", &CAMERA_SHUTTER_BINARY_TEST_CASES));

static CAMERA_SHUTTER_BINARY_TEST_CASES: LazyTestCases<PackBinaryTestCase> = test_case_map!(
    "all_no_info",
    PackBinaryTestCase {
        input: "79 FF FF FF FF",
        parsed: Some(Pack::CameraShutter(validated(
            CameraShutter {
                shutter_speed_consumer: None,
                shutter_speed_professional_upper_line: None,
                shutter_speed_professional_lower_line: None,
                reserved: true,
            },
            *NTSC
        ))),
        ..Default::default()
    },
    "with_values",
    PackBinaryTestCase {
        input: "79 3C 5A 2C 81",
        parsed: Some(Pack::CameraShutter(validated(
            CameraShutter {
                shutter_speed_consumer: Some(0x12C),
                shutter_speed_professional_upper_line: Some(0x3C),
                shutter_speed_professional_lower_line: Some(0x5A),
                reserved: true,
            },
            *PAL
        ))),
        ..Default::default()
    }
);

#[googletest::test]
#[rstest]
#[case::all_no_info(function_name!())]
#[case::with_values(function_name!())]
fn test_camera_shutter_binary(#[case] test_function_name: &str) {
    let tc = CAMERA_SHUTTER_BINARY_TEST_CASES.get_test_case(test_function_name);
    run_pack_binary_test_case(tc);
}
