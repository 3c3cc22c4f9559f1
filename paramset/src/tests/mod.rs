mod translation_tests;
