//! Built-in tag catalogue.
//!
//! One row per standard tag: the directory kind that owns it, its id, its
//! canonical name and the wire types it may legally be stored as. The
//! [`TagRegistry`](super::TagRegistry) indexes this table once on first use.

use super::kinds::DirectoryKind;
use super::types::TagType;

use DirectoryKind::{Exif, GpsInfo, Interop, Primary};
use TagType::{Ascii, Byte, Double, Long, Rational, Short, SignedRational, Undefined};

/// A row of the built-in catalogue.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CatalogueRow {
    pub kind: DirectoryKind,
    pub id: u16,
    pub name: &'static str,
    pub types: &'static [TagType],
}

const fn row(
    kind: DirectoryKind,
    id: u16,
    name: &'static str,
    types: &'static [TagType],
) -> CatalogueRow {
    CatalogueRow {
        kind,
        id,
        name,
        types,
    }
}

pub(crate) static STANDARD_TAGS: [CatalogueRow; 308] = [
    // -------------------------------------------------------------------------
    // Primary (IFD0/IFD1)
    // -------------------------------------------------------------------------
    row(Primary, 0x000b, "ProcessingSoftware", &[Ascii]),
    row(Primary, 0x00fe, "NewSubfileType", &[Long]),
    row(Primary, 0x00ff, "SubfileType", &[Short]),
    row(Primary, 0x0100, "ImageWidth", &[Long, Short]),
    row(Primary, 0x0101, "ImageLength", &[Long, Short]),
    row(Primary, 0x0102, "BitsPerSample", &[Short]),
    row(Primary, 0x0103, "Compression", &[Short]),
    row(Primary, 0x0106, "PhotometricInterpretation", &[Short]),
    row(Primary, 0x0107, "Thresholding", &[Short]),
    row(Primary, 0x0108, "CellWidth", &[Short]),
    row(Primary, 0x0109, "CellLength", &[Short]),
    row(Primary, 0x010a, "FillOrder", &[Short]),
    row(Primary, 0x010d, "DocumentName", &[Ascii]),
    row(Primary, 0x010e, "ImageDescription", &[Ascii]),
    row(Primary, 0x010f, "Make", &[Ascii]),
    row(Primary, 0x0110, "Model", &[Ascii]),
    row(Primary, 0x0111, "StripOffsets", &[Long, Short]),
    row(Primary, 0x0112, "Orientation", &[Short]),
    row(Primary, 0x0115, "SamplesPerPixel", &[Short]),
    row(Primary, 0x0116, "RowsPerStrip", &[Long, Short]),
    row(Primary, 0x0117, "StripByteCounts", &[Long, Short]),
    row(Primary, 0x011a, "XResolution", &[Rational]),
    row(Primary, 0x011b, "YResolution", &[Rational]),
    row(Primary, 0x011c, "PlanarConfiguration", &[Short]),
    row(Primary, 0x0122, "GrayResponseUnit", &[Short]),
    row(Primary, 0x0123, "GrayResponseCurve", &[Short]),
    row(Primary, 0x0124, "T4Options", &[Long]),
    row(Primary, 0x0125, "T6Options", &[Long]),
    row(Primary, 0x0128, "ResolutionUnit", &[Short]),
    row(Primary, 0x0129, "PageNumber", &[Short]),
    row(Primary, 0x012d, "TransferFunction", &[Short]),
    row(Primary, 0x0131, "Software", &[Ascii]),
    row(Primary, 0x0132, "DateTime", &[Ascii]),
    row(Primary, 0x013b, "Artist", &[Ascii]),
    row(Primary, 0x013c, "HostComputer", &[Ascii]),
    row(Primary, 0x013d, "Predictor", &[Short]),
    row(Primary, 0x013e, "WhitePoint", &[Rational]),
    row(Primary, 0x013f, "PrimaryChromaticities", &[Rational]),
    row(Primary, 0x0140, "ColorMap", &[Short]),
    row(Primary, 0x0141, "HalftoneHints", &[Short]),
    row(Primary, 0x0142, "TileWidth", &[Short]),
    row(Primary, 0x0143, "TileLength", &[Short]),
    row(Primary, 0x0144, "TileOffsets", &[Short]),
    row(Primary, 0x0145, "TileByteCounts", &[Short]),
    row(Primary, 0x014a, "SubIFDs", &[Long]),
    row(Primary, 0x014c, "InkSet", &[Short]),
    row(Primary, 0x014d, "InkNames", &[Ascii]),
    row(Primary, 0x014e, "NumberOfInks", &[Short]),
    row(Primary, 0x0150, "DotRange", &[Byte]),
    row(Primary, 0x0151, "TargetPrinter", &[Ascii]),
    row(Primary, 0x0152, "ExtraSamples", &[Short]),
    row(Primary, 0x0153, "SampleFormat", &[Short]),
    row(Primary, 0x0154, "SMinSampleValue", &[Short]),
    row(Primary, 0x0155, "SMaxSampleValue", &[Short]),
    row(Primary, 0x0156, "TransferRange", &[Short]),
    row(Primary, 0x0157, "ClipPath", &[Byte]),
    row(Primary, 0x015a, "Indexed", &[Short]),
    row(Primary, 0x015b, "JPEGTables", &[Undefined]),
    row(Primary, 0x015f, "OPIProxy", &[Short]),
    row(Primary, 0x0200, "JPEGProc", &[Long]),
    row(Primary, 0x0201, "JPEGInterchangeFormat", &[Long]),
    row(Primary, 0x0202, "JPEGInterchangeFormatLength", &[Long]),
    row(Primary, 0x0203, "JPEGRestartInterval", &[Short]),
    row(Primary, 0x0205, "JPEGLosslessPredictors", &[Short]),
    row(Primary, 0x0206, "JPEGPointTransforms", &[Short]),
    row(Primary, 0x0207, "JPEGQTables", &[Long]),
    row(Primary, 0x0208, "JPEGDCTables", &[Long]),
    row(Primary, 0x0209, "JPEGACTables", &[Long]),
    row(Primary, 0x0211, "YCbCrCoefficients", &[Rational]),
    row(Primary, 0x0212, "YCbCrSubSampling", &[Short]),
    row(Primary, 0x0213, "YCbCrPositioning", &[Short]),
    row(Primary, 0x0214, "ReferenceBlackWhite", &[Rational]),
    row(Primary, 0x02bc, "XMLPacket", &[Byte]),
    row(Primary, 0x4746, "Rating", &[Short]),
    row(Primary, 0x4749, "RatingPercent", &[Short]),
    row(Primary, 0x800d, "ImageID", &[Ascii]),
    row(Primary, 0x828d, "CFARepeatPatternDim", &[Short]),
    row(Primary, 0x828e, "CFAPattern", &[Byte]),
    row(Primary, 0x828f, "BatteryLevel", &[Rational]),
    row(Primary, 0x8298, "Copyright", &[Ascii]),
    row(Primary, 0x829a, "ExposureTime", &[Rational, SignedRational]),
    row(Primary, 0x829d, "FNumber", &[Rational, SignedRational]),
    row(Primary, 0x83bb, "IPTCNAA", &[Long]),
    row(Primary, 0x8649, "ImageResources", &[Byte]),
    row(Primary, 0x8769, "ExifTag", &[Long]),
    row(Primary, 0x8773, "InterColorProfile", &[Undefined]),
    row(Primary, 0x8822, "ExposureProgram", &[Short]),
    row(Primary, 0x8824, "SpectralSensitivity", &[Ascii]),
    row(Primary, 0x8825, "GPSTag", &[Long]),
    row(Primary, 0x8827, "ISOSpeedRatings", &[Short]),
    row(Primary, 0x8828, "OECF", &[Undefined]),
    row(Primary, 0x8829, "Interlace", &[Short]),
    row(Primary, 0x882b, "SelfTimerMode", &[Short]),
    row(Primary, 0x9003, "DateTimeOriginal", &[Ascii]),
    row(Primary, 0x9102, "CompressedBitsPerPixel", &[Rational]),
    row(Primary, 0x9201, "ShutterSpeedValue", &[SignedRational]),
    row(Primary, 0x9202, "ApertureValue", &[Rational]),
    row(Primary, 0x9203, "BrightnessValue", &[SignedRational]),
    row(Primary, 0x9204, "ExposureBiasValue", &[SignedRational]),
    row(Primary, 0x9205, "MaxApertureValue", &[Rational]),
    row(Primary, 0x9206, "SubjectDistance", &[SignedRational]),
    row(Primary, 0x9207, "MeteringMode", &[Short]),
    row(Primary, 0x9208, "LightSource", &[Short]),
    row(Primary, 0x9209, "Flash", &[Short]),
    row(Primary, 0x920a, "FocalLength", &[Rational]),
    row(Primary, 0x920b, "FlashEnergy", &[Rational]),
    row(Primary, 0x920c, "SpatialFrequencyResponse", &[Undefined]),
    row(Primary, 0x920d, "Noise", &[Undefined]),
    row(Primary, 0x920e, "FocalPlaneXResolution", &[Rational]),
    row(Primary, 0x920f, "FocalPlaneYResolution", &[Rational]),
    row(Primary, 0x9210, "FocalPlaneResolutionUnit", &[Short]),
    row(Primary, 0x9211, "ImageNumber", &[Long]),
    row(Primary, 0x9212, "SecurityClassification", &[Ascii]),
    row(Primary, 0x9213, "ImageHistory", &[Ascii]),
    row(Primary, 0x9214, "SubjectLocation", &[Short]),
    row(Primary, 0x9215, "ExposureIndex", &[Rational]),
    row(Primary, 0x9216, "TIFFEPStandardID", &[Byte]),
    row(Primary, 0x9217, "SensingMethod", &[Short]),
    row(Primary, 0x9c9b, "XPTitle", &[Byte]),
    row(Primary, 0x9c9c, "XPComment", &[Byte]),
    row(Primary, 0x9c9d, "XPAuthor", &[Byte]),
    row(Primary, 0x9c9e, "XPKeywords", &[Byte]),
    row(Primary, 0x9c9f, "XPSubject", &[Byte]),
    row(Primary, 0xc4a5, "PrintImageMatching", &[Undefined]),
    row(Primary, 0xc612, "DNGVersion", &[Byte]),
    row(Primary, 0xc613, "DNGBackwardVersion", &[Byte]),
    row(Primary, 0xc614, "UniqueCameraModel", &[Ascii]),
    row(Primary, 0xc615, "LocalizedCameraModel", &[Byte]),
    row(Primary, 0xc616, "CFAPlaneColor", &[Byte]),
    row(Primary, 0xc617, "CFALayout", &[Short]),
    row(Primary, 0xc618, "LinearizationTable", &[Short]),
    row(Primary, 0xc619, "BlackLevelRepeatDim", &[Short]),
    row(Primary, 0xc61a, "BlackLevel", &[Rational]),
    row(Primary, 0xc61b, "BlackLevelDeltaH", &[SignedRational]),
    row(Primary, 0xc61c, "BlackLevelDeltaV", &[SignedRational]),
    row(Primary, 0xc61d, "WhiteLevel", &[Short]),
    row(Primary, 0xc61e, "DefaultScale", &[Rational]),
    row(Primary, 0xc61f, "DefaultCropOrigin", &[Short]),
    row(Primary, 0xc620, "DefaultCropSize", &[Short]),
    row(Primary, 0xc621, "ColorMatrix1", &[SignedRational]),
    row(Primary, 0xc622, "ColorMatrix2", &[SignedRational]),
    row(Primary, 0xc623, "CameraCalibration1", &[SignedRational]),
    row(Primary, 0xc624, "CameraCalibration2", &[SignedRational]),
    row(Primary, 0xc625, "ReductionMatrix1", &[SignedRational]),
    row(Primary, 0xc626, "ReductionMatrix2", &[SignedRational]),
    row(Primary, 0xc627, "AnalogBalance", &[Rational]),
    row(Primary, 0xc628, "AsShotNeutral", &[Short]),
    row(Primary, 0xc629, "AsShotWhiteXY", &[Rational]),
    row(Primary, 0xc62a, "BaselineExposure", &[SignedRational]),
    row(Primary, 0xc62b, "BaselineNoise", &[Rational]),
    row(Primary, 0xc62c, "BaselineSharpness", &[Rational]),
    row(Primary, 0xc62d, "BayerGreenSplit", &[Long]),
    row(Primary, 0xc62e, "LinearResponseLimit", &[Rational]),
    row(Primary, 0xc62f, "CameraSerialNumber", &[Ascii]),
    row(Primary, 0xc630, "LensInfo", &[Rational]),
    row(Primary, 0xc631, "ChromaBlurRadius", &[Rational]),
    row(Primary, 0xc632, "AntiAliasStrength", &[Rational]),
    row(Primary, 0xc633, "ShadowScale", &[SignedRational]),
    row(Primary, 0xc634, "DNGPrivateData", &[Byte]),
    row(Primary, 0xc635, "MakerNoteSafety", &[Short]),
    row(Primary, 0xc65a, "CalibrationIlluminant1", &[Short]),
    row(Primary, 0xc65b, "CalibrationIlluminant2", &[Short]),
    row(Primary, 0xc65c, "BestQualityScale", &[Rational]),
    row(Primary, 0xc65d, "RawDataUniqueID", &[Byte]),
    row(Primary, 0xc68b, "OriginalRawFileName", &[Byte]),
    row(Primary, 0xc68c, "OriginalRawFileData", &[Undefined]),
    row(Primary, 0xc68d, "ActiveArea", &[Short]),
    row(Primary, 0xc68e, "MaskedAreas", &[Short]),
    row(Primary, 0xc68f, "AsShotICCProfile", &[Undefined]),
    row(Primary, 0xc690, "AsShotPreProfileMatrix", &[SignedRational]),
    row(Primary, 0xc691, "CurrentICCProfile", &[Undefined]),
    row(Primary, 0xc692, "CurrentPreProfileMatrix", &[SignedRational]),
    row(Primary, 0xc6bf, "ColorimetricReference", &[Short]),
    row(Primary, 0xc6f3, "CameraCalibrationSignature", &[Byte]),
    row(Primary, 0xc6f4, "ProfileCalibrationSignature", &[Byte]),
    row(Primary, 0xc6f6, "AsShotProfileName", &[Byte]),
    row(Primary, 0xc6f7, "NoiseReductionApplied", &[Rational]),
    row(Primary, 0xc6f8, "ProfileName", &[Byte]),
    row(Primary, 0xc6f9, "ProfileHueSatMapDims", &[Long]),
    row(Primary, 0xc6fd, "ProfileEmbedPolicy", &[Long]),
    row(Primary, 0xc6fe, "ProfileCopyright", &[Byte]),
    row(Primary, 0xc714, "ForwardMatrix1", &[SignedRational]),
    row(Primary, 0xc715, "ForwardMatrix2", &[SignedRational]),
    row(Primary, 0xc716, "PreviewApplicationName", &[Byte]),
    row(Primary, 0xc717, "PreviewApplicationVersion", &[Byte]),
    row(Primary, 0xc718, "PreviewSettingsName", &[Byte]),
    row(Primary, 0xc719, "PreviewSettingsDigest", &[Byte]),
    row(Primary, 0xc71a, "PreviewColorSpace", &[Long]),
    row(Primary, 0xc71b, "PreviewDateTime", &[Ascii]),
    row(Primary, 0xc71c, "RawImageDigest", &[Undefined]),
    row(Primary, 0xc71d, "OriginalRawFileDigest", &[Undefined]),
    row(Primary, 0xc71e, "SubTileBlockSize", &[Long]),
    row(Primary, 0xc71f, "RowInterleaveFactor", &[Long]),
    row(Primary, 0xc725, "ProfileLookTableDims", &[Long]),
    row(Primary, 0xc740, "OpcodeList1", &[Undefined]),
    row(Primary, 0xc741, "OpcodeList2", &[Undefined]),
    row(Primary, 0xc74e, "OpcodeList3", &[Undefined]),
    row(Primary, 0x830e, "ModelPixelScaleTag", &[Double]),
    row(Primary, 0x8482, "ModelTiepointTag", &[Double]),
    row(Primary, 0x85d8, "ModelTransformationTag", &[Double]),
    // -------------------------------------------------------------------------
    // Exif
    // -------------------------------------------------------------------------
    row(Exif, 0x829a, "ExposureTime", &[Rational]),
    row(Exif, 0x829d, "FNumber", &[Rational]),
    row(Exif, 0x8822, "ExposureProgram", &[Short]),
    row(Exif, 0x8824, "SpectralSensitivity", &[Ascii]),
    row(Exif, 0x8827, "ISOSpeedRatings", &[Short]),
    row(Exif, 0x8828, "OECF", &[Undefined]),
    row(Exif, 0x8830, "SensitivityType", &[Short]),
    row(Exif, 0x8831, "StandardOutputSensitivity", &[Long]),
    row(Exif, 0x8832, "RecommendedExposureIndex", &[Long]),
    row(Exif, 0x8833, "ISOSpeed", &[Long]),
    row(Exif, 0x8834, "ISOSpeedLatitudeyyy", &[Long]),
    row(Exif, 0x8835, "ISOSpeedLatitudezzz", &[Long]),
    row(Exif, 0x9000, "ExifVersion", &[Undefined]),
    row(Exif, 0x9003, "DateTimeOriginal", &[Ascii]),
    row(Exif, 0x9004, "DateTimeDigitized", &[Ascii]),
    row(Exif, 0x9010, "OffsetTime", &[Ascii]),
    row(Exif, 0x9011, "OffsetTimeOriginal", &[Ascii]),
    row(Exif, 0x9012, "OffsetTimeDigitized", &[Ascii]),
    row(Exif, 0x9101, "ComponentsConfiguration", &[Undefined]),
    row(Exif, 0x9102, "CompressedBitsPerPixel", &[Rational]),
    row(Exif, 0x9201, "ShutterSpeedValue", &[SignedRational]),
    row(Exif, 0x9202, "ApertureValue", &[Rational]),
    row(Exif, 0x9203, "BrightnessValue", &[SignedRational]),
    row(Exif, 0x9204, "ExposureBiasValue", &[SignedRational]),
    row(Exif, 0x9205, "MaxApertureValue", &[Rational]),
    row(Exif, 0x9206, "SubjectDistance", &[Rational]),
    row(Exif, 0x9207, "MeteringMode", &[Short]),
    row(Exif, 0x9208, "LightSource", &[Short]),
    row(Exif, 0x9209, "Flash", &[Short]),
    row(Exif, 0x920a, "FocalLength", &[Rational]),
    row(Exif, 0x9214, "SubjectArea", &[Short]),
    row(Exif, 0x927c, "MakerNote", &[Undefined]),
    row(Exif, 0x9286, "UserComment", &[Undefined]),
    row(Exif, 0x9290, "SubSecTime", &[Ascii]),
    row(Exif, 0x9291, "SubSecTimeOriginal", &[Ascii]),
    row(Exif, 0x9292, "SubSecTimeDigitized", &[Ascii]),
    row(Exif, 0xa000, "FlashpixVersion", &[Undefined]),
    row(Exif, 0xa001, "ColorSpace", &[Short]),
    row(Exif, 0xa002, "PixelXDimension", &[Long, Short]),
    row(Exif, 0xa003, "PixelYDimension", &[Long, Short]),
    row(Exif, 0xa004, "RelatedSoundFile", &[Ascii]),
    row(Exif, 0xa005, "InteroperabilityTag", &[Long]),
    row(Exif, 0xa20b, "FlashEnergy", &[Rational]),
    row(Exif, 0xa20c, "SpatialFrequencyResponse", &[Undefined]),
    row(Exif, 0xa20e, "FocalPlaneXResolution", &[Rational]),
    row(Exif, 0xa20f, "FocalPlaneYResolution", &[Rational]),
    row(Exif, 0xa210, "FocalPlaneResolutionUnit", &[Short]),
    row(Exif, 0xa214, "SubjectLocation", &[Short]),
    row(Exif, 0xa215, "ExposureIndex", &[Rational]),
    row(Exif, 0xa217, "SensingMethod", &[Short]),
    row(Exif, 0xa300, "FileSource", &[Undefined]),
    row(Exif, 0xa301, "SceneType", &[Undefined]),
    row(Exif, 0xa302, "CFAPattern", &[Undefined]),
    row(Exif, 0xa401, "CustomRendered", &[Short]),
    row(Exif, 0xa402, "ExposureMode", &[Short]),
    row(Exif, 0xa403, "WhiteBalance", &[Short]),
    row(Exif, 0xa404, "DigitalZoomRatio", &[Rational]),
    row(Exif, 0xa405, "FocalLengthIn35mmFilm", &[Short]),
    row(Exif, 0xa406, "SceneCaptureType", &[Short]),
    row(Exif, 0xa407, "GainControl", &[Short]),
    row(Exif, 0xa408, "Contrast", &[Short]),
    row(Exif, 0xa409, "Saturation", &[Short]),
    row(Exif, 0xa40a, "Sharpness", &[Short]),
    row(Exif, 0xa40b, "DeviceSettingDescription", &[Undefined]),
    row(Exif, 0xa40c, "SubjectDistanceRange", &[Short]),
    row(Exif, 0xa420, "ImageUniqueID", &[Ascii]),
    row(Exif, 0xa430, "CameraOwnerName", &[Ascii]),
    row(Exif, 0xa431, "BodySerialNumber", &[Ascii]),
    row(Exif, 0xa432, "LensSpecification", &[Rational]),
    row(Exif, 0xa433, "LensMake", &[Ascii]),
    row(Exif, 0xa434, "LensModel", &[Ascii]),
    row(Exif, 0xa435, "LensSerialNumber", &[Ascii]),
    // -------------------------------------------------------------------------
    // GPSInfo
    // -------------------------------------------------------------------------
    row(GpsInfo, 0x0000, "GPSVersionID", &[Byte]),
    row(GpsInfo, 0x0001, "GPSLatitudeRef", &[Ascii]),
    row(GpsInfo, 0x0002, "GPSLatitude", &[Rational]),
    row(GpsInfo, 0x0003, "GPSLongitudeRef", &[Ascii]),
    row(GpsInfo, 0x0004, "GPSLongitude", &[Rational]),
    row(GpsInfo, 0x0005, "GPSAltitudeRef", &[Byte]),
    row(GpsInfo, 0x0006, "GPSAltitude", &[Rational]),
    row(GpsInfo, 0x0007, "GPSTimeStamp", &[Rational]),
    row(GpsInfo, 0x0008, "GPSSatellites", &[Ascii]),
    row(GpsInfo, 0x0009, "GPSStatus", &[Ascii]),
    row(GpsInfo, 0x000a, "GPSMeasureMode", &[Ascii]),
    row(GpsInfo, 0x000b, "GPSDOP", &[Rational]),
    row(GpsInfo, 0x000c, "GPSSpeedRef", &[Ascii]),
    row(GpsInfo, 0x000d, "GPSSpeed", &[Rational]),
    row(GpsInfo, 0x000e, "GPSTrackRef", &[Ascii]),
    row(GpsInfo, 0x000f, "GPSTrack", &[Rational]),
    row(GpsInfo, 0x0010, "GPSImgDirectionRef", &[Ascii]),
    row(GpsInfo, 0x0011, "GPSImgDirection", &[Rational]),
    row(GpsInfo, 0x0012, "GPSMapDatum", &[Ascii]),
    row(GpsInfo, 0x0013, "GPSDestLatitudeRef", &[Ascii]),
    row(GpsInfo, 0x0014, "GPSDestLatitude", &[Rational]),
    row(GpsInfo, 0x0015, "GPSDestLongitudeRef", &[Ascii]),
    row(GpsInfo, 0x0016, "GPSDestLongitude", &[Rational]),
    row(GpsInfo, 0x0017, "GPSDestBearingRef", &[Ascii]),
    row(GpsInfo, 0x0018, "GPSDestBearing", &[Rational]),
    row(GpsInfo, 0x0019, "GPSDestDistanceRef", &[Ascii]),
    row(GpsInfo, 0x001a, "GPSDestDistance", &[Rational]),
    row(GpsInfo, 0x001b, "GPSProcessingMethod", &[Undefined]),
    row(GpsInfo, 0x001c, "GPSAreaInformation", &[Undefined]),
    row(GpsInfo, 0x001d, "GPSDateStamp", &[Ascii]),
    row(GpsInfo, 0x001e, "GPSDifferential", &[Short]),
    // -------------------------------------------------------------------------
    // Interoperability
    // -------------------------------------------------------------------------
    row(Interop, 0x0001, "InteroperabilityIndex", &[Ascii]),
    row(Interop, 0x0002, "InteroperabilityVersion", &[Undefined]),
    row(Interop, 0x1000, "RelatedImageFileFormat", &[Ascii]),
    row(Interop, 0x1001, "RelatedImageWidth", &[Long]),
    row(Interop, 0x1002, "RelatedImageLength", &[Long]),
];
